use super::grid::{Cell, Direction};
use serde::Serialize;
use std::collections::BTreeMap;

pub type SessionId = String;

#[derive(Debug, Clone, Serialize)]
pub struct Player {
  pub id: SessionId,
  pub name: String,
  #[serde(rename = "snake")]
  pub body: Vec<Cell>,
  #[serde(rename = "dir")]
  pub direction: Direction,
  pub score: u32,
  pub color: String,
}

impl Player {
  pub fn head(&self) -> Option<Cell> {
    self.body.first().copied()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameStateSnapshot<'a> {
  pub players: &'a BTreeMap<SessionId, Player>,
  pub food: Cell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
  pub name: String,
  pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
  pub name: String,
  pub score: u32,
  pub color: String,
}
