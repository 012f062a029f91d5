use crate::game::types::SessionId;
use tokio::sync::mpsc;

/// Lifecycle of one connected socket. A session that disconnects is dropped from the
/// engine entirely, so `Disconnected` only shows up as the result of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connected,
    Joined,
    Disconnected,
}

#[derive(Debug)]
pub struct SessionEntry {
    sender: mpsc::UnboundedSender<String>,
    phase: SessionPhase,
}

impl SessionEntry {
    pub(crate) fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            sender,
            phase: SessionPhase::Connected,
        }
    }

    pub(crate) fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub(crate) fn is_joined(&self) -> bool {
        self.phase == SessionPhase::Joined
    }

    /// Join is accepted from both `Connected` and `Joined`; the latter replaces the player.
    pub(crate) fn join(&mut self) -> bool {
        match self.phase {
            SessionPhase::Connected | SessionPhase::Joined => {
                self.phase = SessionPhase::Joined;
                true
            }
            SessionPhase::Disconnected => false,
        }
    }

    pub(crate) fn eliminate(&mut self) {
        if self.phase == SessionPhase::Joined {
            self.phase = SessionPhase::Connected;
        }
    }

    /// Returns whether a player was attached at the time of disconnection.
    pub(crate) fn disconnect(&mut self) -> bool {
        let was_joined = self.is_joined();
        self.phase = SessionPhase::Disconnected;
        was_joined
    }

    /// Queues a frame for the socket writer. Fails once the writer has gone away.
    pub(crate) fn send(&self, payload: String) -> bool {
        self.sender.send(payload).is_ok()
    }
}

/// What the transport needs to drive one socket.
pub struct SessionIo {
    pub session_id: SessionId,
    pub outbound_rx: mpsc::UnboundedReceiver<String>,
}
