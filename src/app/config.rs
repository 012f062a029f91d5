// Process configuration, read once from the environment at startup.

use crate::game::constants::{DEFAULT_GRID_SIZE, TICK_MS};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 4000;

#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,
  pub database_url: String,
  /// `None` allows any origin.
  pub allowed_origin: Option<String>,
  pub grid_width: u16,
  pub grid_height: u16,
  pub tick: Duration,
}

impl Config {
  /// Environment variables:
  /// - `PORT` (default 4000)
  /// - `DATABASE_URL` (default `sqlite://<cwd>/data/leaderboard.db`)
  /// - `ALLOWED_ORIGIN` (default any; `*` also means any)
  /// - `GRID_WIDTH`, `GRID_HEIGHT` (default 20)
  /// - `TICK_MS` (default 200)
  ///
  /// Unparseable numbers fall back to their defaults.
  pub fn from_env() -> Self {
    Self::from_lookup(|key| env::var(key).ok())
  }

  fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let number = |key: &str| lookup(key).and_then(|value| value.trim().parse::<u64>().ok());

    let database_url = lookup("DATABASE_URL")
      .map(|value| value.trim().to_string())
      .filter(|value| !value.is_empty())
      .unwrap_or_else(|| {
        let base = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let default_path = base.join("data").join("leaderboard.db");
        format!("sqlite://{}", default_path.display())
      });

    let allowed_origin = lookup("ALLOWED_ORIGIN")
      .map(|value| value.trim().to_string())
      .filter(|value| !value.is_empty() && value != "*");

    let grid_size = |key: &str| {
      number(key)
        .and_then(|value| u16::try_from(value).ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_GRID_SIZE)
    };

    Self {
      port: number("PORT")
        .and_then(|value| u16::try_from(value).ok())
        .unwrap_or(DEFAULT_PORT),
      database_url,
      allowed_origin,
      grid_width: grid_size("GRID_WIDTH"),
      grid_height: grid_size("GRID_HEIGHT"),
      tick: Duration::from_millis(number("TICK_MS").filter(|ms| *ms > 0).unwrap_or(TICK_MS)),
    }
  }
}
