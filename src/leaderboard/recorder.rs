use super::LeaderboardStore;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
  pub name: String,
  pub score: u32,
}

/// Engine-side handle of the persistence queue. `record` never waits; a report that
/// cannot be queued is logged and lost.
#[derive(Debug, Clone)]
pub struct ScoreRecorder {
  sender: mpsc::Sender<ScoreReport>,
}

impl ScoreRecorder {
  pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ScoreReport>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (Self { sender }, receiver)
  }

  pub fn record(&self, name: &str, score: u32) {
    let report = ScoreReport {
      name: name.to_string(),
      score,
    };
    match self.sender.try_send(report) {
      Ok(()) => {}
      Err(TrySendError::Full(report)) => {
        tracing::warn!(name = %report.name, score = report.score, "score queue full, dropping report");
      }
      Err(TrySendError::Closed(report)) => {
        tracing::warn!(name = %report.name, score = report.score, "score writer gone, dropping report");
      }
    }
  }
}

/// Drains queued reports into the store one at a time. Failures are logged, never retried.
pub fn spawn_score_writer(
  store: LeaderboardStore,
  mut reports: mpsc::Receiver<ScoreReport>,
) -> JoinHandle<()> {
  tokio::spawn(async move {
    while let Some(report) = reports.recv().await {
      match store.record_score(&report.name, report.score).await {
        Ok(()) => {
          tracing::debug!(name = %report.name, score = report.score, "best score recorded");
        }
        Err(error) => {
          tracing::warn!(?error, name = %report.name, score = report.score, "failed to persist best score");
        }
      }
    }
  })
}
