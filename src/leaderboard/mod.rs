//! Durable best-score table. One row per player name; a row's score only ever goes up.

pub mod recorder;

use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
  pub name: String,
  #[sqlx(rename = "best_score")]
  pub score: i64,
  pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct LeaderboardStore {
  pool: SqlitePool,
}

impl LeaderboardStore {
  pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
    ensure_db_dir(database_url)?;
    let pool = SqlitePoolOptions::new()
      .max_connections(5)
      .connect(database_url)
      .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(Self { pool })
  }

  /// Keeps the larger of the stored and reported score for `name`.
  pub async fn record_score(&self, name: &str, score: u32) -> Result<(), sqlx::Error> {
    sqlx::query(
      "INSERT INTO leaderboard (name, best_score, updated_at) VALUES (?, ?, ?)
       ON CONFLICT(name) DO UPDATE SET
         updated_at = CASE WHEN excluded.best_score > leaderboard.best_score
           THEN excluded.updated_at ELSE leaderboard.updated_at END,
         best_score = MAX(leaderboard.best_score, excluded.best_score)",
    )
    .bind(name)
    .bind(i64::from(score))
    .bind(crate::app::time::now_millis())
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  pub async fn top(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    sqlx::query_as::<_, LeaderboardEntry>(
      "SELECT name, best_score, updated_at FROM leaderboard
       ORDER BY best_score DESC, updated_at ASC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(&self.pool)
    .await
  }

  #[cfg(test)]
  pub(crate) async fn best_score(&self, name: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT best_score FROM leaderboard WHERE name = ?")
      .bind(name)
      .fetch_optional(&self.pool)
      .await
  }

  #[cfg(test)]
  pub(crate) async fn in_memory() -> Self {
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .connect("sqlite::memory:")
      .await
      .expect("in-memory sqlite");
    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .expect("migrations");
    Self { pool }
  }

  #[cfg(test)]
  pub(crate) async fn close(&self) {
    self.pool.close().await;
  }
}

fn ensure_db_dir(database_url: &str) -> anyhow::Result<()> {
  if database_url.starts_with("sqlite::memory:") {
    return Ok(());
  }
  let path = database_url
    .strip_prefix("sqlite://")
    .or_else(|| database_url.strip_prefix("sqlite:"));
  let Some(path) = path else { return Ok(()) };
  let path = path.split('?').next().unwrap_or_default();
  if path.is_empty() || path == ":memory:" {
    return Ok(());
  }
  let db_path = PathBuf::from(path);
  if let Some(parent) = db_path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  if !db_path.exists() {
    let _ = std::fs::File::create(&db_path)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn first_report_creates_record() {
    let store = LeaderboardStore::in_memory().await;
    store.record_score("X", 20).await.expect("upsert");
    assert_eq!(store.best_score("X").await.expect("query"), Some(20));
  }

  #[tokio::test]
  async fn lower_report_keeps_best_score() {
    let store = LeaderboardStore::in_memory().await;
    store.record_score("X", 30).await.expect("upsert");
    store.record_score("X", 20).await.expect("upsert");
    assert_eq!(store.best_score("X").await.expect("query"), Some(30));

    store.record_score("X", 50).await.expect("upsert");
    assert_eq!(store.best_score("X").await.expect("query"), Some(50));
  }

  #[tokio::test]
  async fn top_orders_by_best_score_and_limits() {
    let store = LeaderboardStore::in_memory().await;
    for (name, score) in [("a", 10), ("b", 40), ("c", 0), ("d", 20)] {
      store.record_score(name, score).await.expect("upsert");
    }
    let top = store.top(3).await.expect("query");
    let names: Vec<&str> = top.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["b", "d", "a"]);
    assert_eq!(top[0].score, 40);
  }

  #[test]
  fn ensure_db_dir_skips_memory_urls() {
    assert!(ensure_db_dir("sqlite::memory:").is_ok());
    assert!(ensure_db_dir("sqlite://:memory:").is_ok());
    assert!(ensure_db_dir("postgres://localhost/db").is_ok());
  }
}
