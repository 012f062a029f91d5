use super::grid::Board;
use super::session::{SessionEntry, SessionIo};
use super::state::{Elimination, GameState};
use super::types::{PlayerSummary, SessionId};
use crate::game::constants::EVENT_CHANNEL_CAPACITY;
use crate::leaderboard::recorder::ScoreRecorder;
use crate::protocol::{encode_server_message, ClientMessage, ServerMessage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;


/// Everything that can reach the engine from outside its task.
#[derive(Debug)]
pub enum EngineEvent {
  Connect {
    session_id: SessionId,
    sender: mpsc::UnboundedSender<String>,
  },
  Message {
    session_id: SessionId,
    message: ClientMessage,
  },
  Disconnect {
    session_id: SessionId,
  },
  Players {
    reply: oneshot::Sender<Vec<PlayerSummary>>,
  },
}

/// Cloneable front door to the engine task. Sends fail only once the engine has stopped.
#[derive(Debug, Clone)]
pub struct EngineHandle {
  events: mpsc::Sender<EngineEvent>,
}

impl EngineHandle {
  pub async fn connect(&self) -> Option<SessionIo> {
    let session_id = Uuid::new_v4().to_string();
    let (sender, outbound_rx) = mpsc::unbounded_channel();
    self
      .events
      .send(EngineEvent::Connect {
        session_id: session_id.clone(),
        sender,
      })
      .await
      .ok()?;
    Some(SessionIo {
      session_id,
      outbound_rx,
    })
  }

  pub async fn send_message(&self, session_id: &str, message: ClientMessage) {
    let event = EngineEvent::Message {
      session_id: session_id.to_string(),
      message,
    };
    if self.events.send(event).await.is_err() {
      tracing::warn!(session_id, "engine stopped, dropping client message");
    }
  }

  pub async fn disconnect(&self, session_id: &str) {
    let event = EngineEvent::Disconnect {
      session_id: session_id.to_string(),
    };
    if self.events.send(event).await.is_err() {
      tracing::warn!(session_id, "engine stopped before disconnect");
    }
  }

  pub async fn players(&self) -> Option<Vec<PlayerSummary>> {
    let (reply, response) = oneshot::channel();
    self.events.send(EngineEvent::Players { reply }).await.ok()?;
    response.await.ok()
  }
}

/// Owns the game state and every session. Runs on a single task; all mutation happens
/// there, between ticks.
#[derive(Debug)]
pub struct Engine {
  state: GameState,
  sessions: HashMap<SessionId, SessionEntry>,
  scores: ScoreRecorder,
  rng: StdRng,
}

impl Engine {
  pub fn new(board: Board, scores: ScoreRecorder) -> Self {
    Self::with_rng(board, scores, StdRng::from_entropy())
  }

  pub fn with_rng(board: Board, scores: ScoreRecorder, mut rng: StdRng) -> Self {
    let state = GameState::new(board, &mut rng);
    Self {
      state,
      sessions: HashMap::new(),
      scores,
      rng,
    }
  }

  pub fn spawn(self, tick: Duration) -> (EngineHandle, JoinHandle<()>) {
    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let task = tokio::spawn(self.run(events_rx, tick));
    (EngineHandle { events: events_tx }, task)
  }

  async fn run(mut self, mut events: mpsc::Receiver<EngineEvent>, tick: Duration) {
    let mut interval = tokio::time::interval(tick);
    loop {
      tokio::select! {
        biased;
        _ = interval.tick() => self.tick(),
        event = events.recv() => {
          let Some(event) = event else { break };
          self.handle_event(event);
        }
      }
    }
    tracing::info!("engine stopped");
  }

  fn handle_event(&mut self, event: EngineEvent) {
    match event {
      EngineEvent::Connect { session_id, sender } => self.connect_session(session_id, sender),
      EngineEvent::Message {
        session_id,
        message,
      } => self.handle_message(&session_id, message),
      EngineEvent::Disconnect { session_id } => self.disconnect_session(&session_id),
      EngineEvent::Players { reply } => {
        let _ = reply.send(self.state.summaries());
      }
    }
  }

  fn connect_session(&mut self, session_id: SessionId, sender: mpsc::UnboundedSender<String>) {
    tracing::info!(session_id, "session connected");
    self.sessions.insert(session_id, SessionEntry::new(sender));
  }

  fn handle_message(&mut self, session_id: &str, message: ClientMessage) {
    let Some(session) = self.sessions.get_mut(session_id) else { return };
    match message {
      ClientMessage::Join { name } => {
        if !session.join() {
          return;
        }
        let player = self.state.join(session_id, name, &mut self.rng);
        tracing::info!(session_id, name = %player.name, "player joined");
      }
      ClientMessage::Turn { direction } => {
        if session.is_joined() {
          self.state.set_direction(session_id, direction);
        }
      }
    }
  }

  fn disconnect_session(&mut self, session_id: &str) {
    let Some(mut session) = self.sessions.remove(session_id) else { return };
    let was_joined = session.disconnect();
    if !was_joined {
      tracing::info!(session_id, "session disconnected");
      return;
    }
    if let Some(player) = self.state.remove(session_id) {
      tracing::info!(session_id, name = %player.name, score = player.score, "player disconnected");
      self.scores.record(&player.name, player.score);
    }
  }

  pub(crate) fn tick(&mut self) {
    let report = self.state.tick(&mut self.rng);
    if let Some(id) = &report.fed {
      tracing::debug!(session_id = %id, "food eaten");
    }
    for elimination in report.eliminations {
      self.handle_elimination(elimination);
    }
    self.broadcast_state();
  }

  fn handle_elimination(&mut self, elimination: Elimination) {
    let Elimination {
      id,
      name,
      score,
      cause,
    } = elimination;
    tracing::debug!(session_id = %id, name = %name, score, ?cause, "player eliminated");

    if let Some(session) = self.sessions.get_mut(&id) {
      session.eliminate();
      if let Some(payload) = encode_server_message(&ServerMessage::GameOver(score)) {
        if !session.send(payload) {
          tracing::debug!(session_id = %id, "game over not delivered, socket already closed");
        }
      }
    }
    self.scores.record(&name, score);
  }

  fn broadcast_state(&mut self) {
    let snapshot = self.state.snapshot();
    let Some(state_payload) = encode_server_message(&ServerMessage::GameState(snapshot)) else {
      return;
    };
    let leaderboard = self.state.leaderboard();
    let Some(leaderboard_payload) = encode_server_message(&ServerMessage::Leaderboard(&leaderboard))
    else {
      return;
    };

    let mut stale = Vec::new();
    for (session_id, session) in &self.sessions {
      if !session.send(state_payload.clone()) || !session.send(leaderboard_payload.clone()) {
        stale.push(session_id.clone());
      }
    }
    for session_id in stale {
      self.disconnect_session(&session_id);
    }
  }

  #[cfg(test)]
  pub(crate) fn session_phase(&self, session_id: &str) -> Option<super::session::SessionPhase> {
    self.sessions.get(session_id).map(SessionEntry::phase)
  }

  #[cfg(test)]
  pub(crate) fn state_mut(&mut self) -> &mut GameState {
    &mut self.state
  }
}
