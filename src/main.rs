use axum::{
  extract::{Query, State, WebSocketUpgrade},
  http::{HeaderValue, Method, StatusCode},
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod game;
mod leaderboard;
mod protocol;
mod shared;
mod transport;

use app::config::Config;
use game::constants::SCORE_QUEUE_CAPACITY;
use game::engine::{Engine, EngineHandle};
use game::grid::Board;
use leaderboard::recorder::{spawn_score_writer, ScoreRecorder};
use leaderboard::LeaderboardStore;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

#[derive(Clone)]
struct AppState {
  engine: EngineHandle,
  leaderboard: LeaderboardStore,
}

#[derive(Debug, Serialize)]
struct OkResponse {
  ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
  ok: bool,
  error: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = Config::from_env();
  let leaderboard = LeaderboardStore::connect(&config.database_url).await?;

  let (scores, reports) = ScoreRecorder::channel(SCORE_QUEUE_CAPACITY);
  spawn_score_writer(leaderboard.clone(), reports);

  let board = Board::new(config.grid_width, config.grid_height);
  let (engine, engine_task) = Engine::new(board, scores).spawn(config.tick);
  tracing::info!(
    width = board.width(),
    height = board.height(),
    tick_ms = config.tick.as_millis() as u64,
    "engine started"
  );

  let state = Arc::new(AppState {
    engine,
    leaderboard,
  });

  let app: Router = Router::new()
    .route("/api/health", get(health))
    .route("/api/leaderboard", get(leaderboard_get))
    .route("/api/players", get(players_get))
    .route("/ws", get(ws_handler))
    .layer(cors_layer(config.allowed_origin.as_deref())?)
    .with_state(state);

  let address = format!("0.0.0.0:{}", config.port);
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  serve_until_engine_exits(axum::serve(listener, app).into_future(), engine_task).await
}

/// Serves until the listener fails or the engine task ends. Any engine exit is an error.
async fn serve_until_engine_exits(
  server: impl Future<Output = std::io::Result<()>>,
  engine_task: JoinHandle<()>,
) -> anyhow::Result<()> {
  tokio::select! {
    result = server => Ok(result?),
    result = engine_task => {
      match result {
        Ok(()) => tracing::error!("engine task exited"),
        Err(error) => tracing::error!(?error, "engine task failed"),
      }
      anyhow::bail!("game engine stopped")
    }
  }
}

fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
  let cors = CorsLayer::new()
    .allow_methods([Method::GET])
    .allow_headers(Any);
  Ok(match allowed_origin {
    Some(origin) => cors.allow_origin(HeaderValue::from_str(origin)?),
    None => cors.allow_origin(Any),
  })
}

async fn health() -> impl IntoResponse {
  Json(OkResponse { ok: true })
}

async fn leaderboard_get(
  State(state): State<Arc<AppState>>,
  Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
  let limit = params
    .get("limit")
    .and_then(|value| value.parse::<i64>().ok())
    .unwrap_or(DEFAULT_LIMIT);
  let limit = limit.clamp(1, MAX_LIMIT);

  match state.leaderboard.top(limit).await {
    Ok(scores) => (StatusCode::OK, Json(scores)).into_response(),
    Err(error) => {
      tracing::warn!(?error, "failed to load leaderboard");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
          ok: false,
          error: "Failed to load leaderboard".to_string(),
        }),
      )
        .into_response()
    }
  }
}

async fn players_get(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match state.engine.players().await {
    Some(players) => (StatusCode::OK, Json(players)).into_response(),
    None => (
      StatusCode::SERVICE_UNAVAILABLE,
      Json(ErrorResponse {
        ok: false,
        error: "Game engine unavailable".to_string(),
      }),
    )
      .into_response(),
  }
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let engine = state.engine.clone();
  ws.on_upgrade(move |socket| transport::ws_session::handle_socket(socket, engine))
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::body::to_bytes;
  use axum::response::Response;
  use serde_json::Value;
  use std::time::Duration;

  async fn app_state() -> Arc<AppState> {
    let leaderboard = LeaderboardStore::in_memory().await;
    let (scores, _reports) = ScoreRecorder::channel(4);
    let (engine, _task) = Engine::new(Board::new(20, 20), scores).spawn(Duration::from_secs(3600));
    Arc::new(AppState {
      engine,
      leaderboard,
    })
  }

  async fn body_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
      .await
      .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
  }

  async fn leaderboard_with(state: &Arc<AppState>, query: &[(&str, &str)]) -> (StatusCode, Value) {
    let params = query
      .iter()
      .map(|(key, value)| (key.to_string(), value.to_string()))
      .collect();
    let response = leaderboard_get(State(state.clone()), Query(params))
      .await
      .into_response();
    body_json(response).await
  }

  #[test]
  fn cors_accepts_any_or_a_single_origin() {
    assert!(cors_layer(None).is_ok());
    assert!(cors_layer(Some("http://localhost:5173")).is_ok());
    assert!(cors_layer(Some("bad\norigin")).is_err());
  }

  #[tokio::test]
  async fn leaderboard_defaults_to_top_ten_as_bare_array() {
    let state = app_state().await;
    for index in 0..12u32 {
      state
        .leaderboard
        .record_score(&format!("P{index:02}"), index * 10)
        .await
        .expect("seed");
    }

    let (status, body) = leaderboard_with(&state, &[]).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array body");
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0]["name"], "P11");
    assert_eq!(rows[0]["score"], 110);
    let scores: Vec<i64> = rows.iter().filter_map(|row| row["score"].as_i64()).collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
  }

  #[tokio::test]
  async fn leaderboard_limit_is_clamped() {
    let state = app_state().await;
    for index in 0..60u32 {
      state
        .leaderboard
        .record_score(&format!("P{index:02}"), index)
        .await
        .expect("seed");
    }

    let len = |body: &Value| body.as_array().map(Vec::len);
    assert_eq!(len(&leaderboard_with(&state, &[("limit", "3")]).await.1), Some(3));
    assert_eq!(len(&leaderboard_with(&state, &[("limit", "0")]).await.1), Some(1));
    assert_eq!(len(&leaderboard_with(&state, &[("limit", "-5")]).await.1), Some(1));
    assert_eq!(len(&leaderboard_with(&state, &[("limit", "999")]).await.1), Some(50));
    assert_eq!(len(&leaderboard_with(&state, &[("limit", "lots")]).await.1), Some(10));
  }

  #[tokio::test]
  async fn players_returns_bare_array_of_summaries() {
    let state = app_state().await;
    let session = state.engine.connect().await.expect("engine running");
    let join = protocol::ClientMessage::Join {
      name: "Ada".to_string(),
    };
    state.engine.send_message(&session.session_id, join).await;

    let response = players_get(State(state.clone())).await.into_response();
    let (status, body) = body_json(response).await;
    assert_eq!(status, StatusCode::OK);
    let players = body.as_array().expect("array body");
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["name"], "Ada");
    assert_eq!(players[0]["score"], 0);
    assert!(players[0]["color"].as_str().is_some_and(|color| color.starts_with('#')));
  }

  #[tokio::test]
  async fn players_reports_unavailable_once_engine_stops() {
    let leaderboard = LeaderboardStore::in_memory().await;
    let (scores, _reports) = ScoreRecorder::channel(4);
    let (engine, task) = Engine::new(Board::new(20, 20), scores).spawn(Duration::from_secs(3600));
    task.abort();
    let _ = task.await;
    let state = Arc::new(AppState {
      engine,
      leaderboard,
    });

    let response = players_get(State(state)).await.into_response();
    let (status, body) = body_json(response).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ok"], false);
  }

  #[tokio::test]
  async fn engine_panic_stops_the_server() {
    let engine_task = tokio::spawn(async { panic!("engine blew up") });
    let server = std::future::pending::<std::io::Result<()>>();
    let result = serve_until_engine_exits(server, engine_task).await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn engine_exit_stops_the_server() {
    let engine_task = tokio::spawn(async {});
    let server = std::future::pending::<std::io::Result<()>>();
    let result = serve_until_engine_exits(server, engine_task).await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn server_shutdown_returns_ok() {
    let engine_task = tokio::spawn(std::future::pending::<()>());
    let server = async { Ok::<(), std::io::Error>(()) };
    let result = serve_until_engine_exits(server, engine_task).await;
    assert!(result.is_ok());
  }
}
