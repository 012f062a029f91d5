use super::collision::{
  advance_body, head_on_collisions, resolve, EliminationCause, Move, Outcome, TickSnapshot,
};
use super::constants::{COLOR_POOL, FOOD_REWARD, MAX_PLACEMENT_ATTEMPTS};
use super::grid::{Board, Cell, Direction};
use super::types::{GameStateSnapshot, LeaderboardRow, Player, PlayerSummary, SessionId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// The single authoritative copy of the board: every live player plus the food cell.
#[derive(Debug)]
pub struct GameState {
  board: Board,
  players: BTreeMap<SessionId, Player>,
  food: Cell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elimination {
  pub id: SessionId,
  pub name: String,
  pub score: u32,
  pub cause: EliminationCause,
}

#[derive(Debug, Default)]
pub struct TickReport {
  pub eliminations: Vec<Elimination>,
  pub fed: Option<SessionId>,
}

impl GameState {
  pub fn new<R: Rng + ?Sized>(board: Board, rng: &mut R) -> Self {
    let mut state = Self {
      board,
      players: BTreeMap::new(),
      food: Cell::new(0, 0),
    };
    state.food = state.free_cell(rng);
    state
  }

  /// Creates a fresh player for `id`, replacing any player the session already had.
  pub fn join<R: Rng + ?Sized>(&mut self, id: &str, name: String, rng: &mut R) -> &Player {
    self.players.remove(id);
    let spawn = self.free_cell(rng);
    let color = COLOR_POOL.choose(rng).copied().unwrap_or(COLOR_POOL[0]);
    let player = Player {
      id: id.to_string(),
      name,
      body: vec![spawn],
      direction: Direction::Right,
      score: 0,
      color: color.to_string(),
    };
    self.players.entry(id.to_string()).or_insert(player)
  }

  pub fn set_direction(&mut self, id: &str, direction: Direction) -> bool {
    let Some(player) = self.players.get_mut(id) else { return false };
    player.direction = direction;
    true
  }

  pub fn remove(&mut self, id: &str) -> Option<Player> {
    self.players.remove(id)
  }

  /// Advances every player one cell. All collision checks use the bodies as they stood
  /// before the tick; eliminated players are gone from the store when this returns.
  pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickReport {
    let snapshot = TickSnapshot::capture(self.players.values());
    let mut report = TickReport::default();
    let mut moves: Vec<Move> = Vec::with_capacity(self.players.len());
    let mut causes: Vec<(SessionId, EliminationCause)> = Vec::new();

    for player in self.players.values() {
      match resolve(player, &self.board, &snapshot, self.food) {
        Outcome::Eliminated(cause) => causes.push((player.id.clone(), cause)),
        Outcome::Moved { head, eats } => moves.push(Move {
          id: player.id.clone(),
          head,
          eats,
        }),
      }
    }

    let head_on = head_on_collisions(&moves);
    if !head_on.is_empty() {
      moves.retain(|movement| !head_on.contains(&movement.id));
      causes.extend(head_on.into_iter().map(|id| (id, EliminationCause::HeadOn)));
      causes.sort_by(|a, b| a.0.cmp(&b.0));
    }

    for (id, cause) in causes {
      let Some(player) = self.players.remove(&id) else { continue };
      report.eliminations.push(Elimination {
        id,
        name: player.name,
        score: player.score,
        cause,
      });
    }

    for movement in moves {
      let Some(player) = self.players.get_mut(&movement.id) else { continue };
      advance_body(&mut player.body, movement.head, movement.eats);
      if movement.eats {
        player.score += FOOD_REWARD;
        report.fed = Some(movement.id);
      }
    }

    if report.fed.is_some() {
      self.food = self.free_cell(rng);
    }

    report
  }

  pub fn snapshot(&self) -> GameStateSnapshot<'_> {
    GameStateSnapshot {
      players: &self.players,
      food: self.food,
    }
  }

  /// Live players by score, highest first. Ties keep session order.
  pub fn leaderboard(&self) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = self
      .players
      .values()
      .map(|player| LeaderboardRow {
        name: player.name.clone(),
        score: player.score,
      })
      .collect();
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows
  }

  pub fn summaries(&self) -> Vec<PlayerSummary> {
    self
      .players
      .values()
      .map(|player| PlayerSummary {
        name: player.name.clone(),
        score: player.score,
        color: player.color.clone(),
      })
      .collect()
  }

  fn is_occupied(&self, cell: Cell) -> bool {
    self.players.values().any(|player| player.body.contains(&cell))
  }

  fn free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Cell {
    let width = self.board.width();
    let height = self.board.height();
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
      let cell = Cell::new(rng.gen_range(0..width), rng.gen_range(0..height));
      if !self.is_occupied(cell) {
        return cell;
      }
    }

    let free: Vec<Cell> = self
      .board
      .cells()
      .filter(|cell| !self.is_occupied(*cell))
      .collect();
    match free.choose(rng) {
      Some(cell) => *cell,
      None => {
        tracing::debug!("board saturated, placing on an occupied cell");
        Cell::new(rng.gen_range(0..width), rng.gen_range(0..height))
      }
    }
  }
}

#[cfg(test)]
impl GameState {
  pub(crate) fn board(&self) -> &Board {
    &self.board
  }

  pub(crate) fn food(&self) -> Cell {
    self.food
  }

  pub(crate) fn players(&self) -> &BTreeMap<SessionId, Player> {
    &self.players
  }

  pub(crate) fn player(&self, id: &str) -> Option<&Player> {
    self.players.get(id)
  }

  pub(crate) fn contains(&self, id: &str) -> bool {
    self.players.contains_key(id)
  }

  pub(crate) fn place_food(&mut self, cell: Cell) {
    self.food = cell;
  }

  pub(crate) fn insert_player(&mut self, player: Player) {
    self.players.insert(player.id.clone(), player);
  }
}
