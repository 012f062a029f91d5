use super::grid::{Board, Cell};
use super::types::{Player, SessionId};
use std::collections::{HashMap, HashSet};

/// Why a player left the board. Checked in declaration order; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EliminationCause {
  Wall,
  SelfBite,
  Opponent { other: SessionId },
  HeadOn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
  pub id: SessionId,
  pub head: Cell,
  pub eats: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Eliminated(EliminationCause),
  Moved { head: Cell, eats: bool },
}

/// Bodies as they stood when the tick began, in ascending session order.
#[derive(Debug)]
pub struct TickSnapshot {
  bodies: Vec<(SessionId, Vec<Cell>)>,
}

impl TickSnapshot {
  pub fn capture<'a>(players: impl IntoIterator<Item = &'a Player>) -> Self {
    Self {
      bodies: players
        .into_iter()
        .map(|player| (player.id.clone(), player.body.clone()))
        .collect(),
    }
  }

  fn occupant_other_than(&self, player_id: &str, cell: Cell) -> Option<&SessionId> {
    self
      .bodies
      .iter()
      .filter(|(id, _)| id != player_id)
      .find(|(_, body)| body.contains(&cell))
      .map(|(id, _)| id)
  }
}

pub fn resolve(
  player: &Player,
  board: &Board,
  snapshot: &TickSnapshot,
  food: Cell,
) -> Outcome {
  let Some(head) = player.head() else {
    return Outcome::Eliminated(EliminationCause::SelfBite);
  };
  let next = head.step(player.direction);

  if !board.contains(next) {
    return Outcome::Eliminated(EliminationCause::Wall);
  }
  if player.body.contains(&next) {
    return Outcome::Eliminated(EliminationCause::SelfBite);
  }
  if let Some(other) = snapshot.occupant_other_than(&player.id, next) {
    return Outcome::Eliminated(EliminationCause::Opponent {
      other: other.clone(),
    });
  }

  Outcome::Moved {
    head: next,
    eats: next == food,
  }
}

/// Returns every mover that shares its destination cell with another mover.
pub fn head_on_collisions(moves: &[Move]) -> HashSet<SessionId> {
  let mut by_cell: HashMap<Cell, Vec<&SessionId>> = HashMap::new();
  for movement in moves {
    by_cell.entry(movement.head).or_default().push(&movement.id);
  }
  by_cell
    .into_values()
    .filter(|ids| ids.len() > 1)
    .flatten()
    .cloned()
    .collect()
}

pub fn advance_body(body: &mut Vec<Cell>, head: Cell, grow: bool) {
  body.insert(0, head);
  if !grow {
    body.pop();
  }
}
