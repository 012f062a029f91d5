//! JSON events exchanged over the game socket. Every frame is
//! `{"event": <name>, "data": <payload>}`.

use crate::game::grid::Direction;
use crate::game::types::{GameStateSnapshot, LeaderboardRow};
use crate::shared::names::sanitize_player_name;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
  Join { name: String },
  Turn { direction: Direction },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
enum JsonClientMessage {
  #[serde(rename = "joinGame")]
  Join(String),
  #[serde(rename = "keydown")]
  Keydown(String),
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage<'a> {
  #[serde(rename = "gameState")]
  GameState(GameStateSnapshot<'a>),
  #[serde(rename = "leaderboard")]
  Leaderboard(&'a [LeaderboardRow]),
  #[serde(rename = "gameOver")]
  GameOver(u32),
}

/// Malformed frames, unknown events, blank names and unknown directions all decode to `None`.
pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
  let message = serde_json::from_str::<JsonClientMessage>(text).ok()?;
  match message {
    JsonClientMessage::Join(name) => {
      let name = sanitize_player_name(&name)?;
      Some(ClientMessage::Join { name })
    }
    JsonClientMessage::Keydown(value) => {
      let direction = Direction::parse(&value)?;
      Some(ClientMessage::Turn { direction })
    }
  }
}

pub fn encode_server_message(message: &ServerMessage<'_>) -> Option<String> {
  match serde_json::to_string(message) {
    Ok(payload) => Some(payload),
    Err(error) => {
      tracing::warn!(?error, "failed to encode server message");
      None
    }
  }
}
