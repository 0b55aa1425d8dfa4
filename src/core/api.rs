//! HTTP + WebSocket API for remote detector clients
//!
//! Endpoints:
//! - POST /game/new - Start a new game
//! - GET /game/{id} - Get game status
//! - DELETE /game/{id} - End a game
//! - POST /game/{id}/command - Start / Stop / Reset button
//! - POST /game/{id}/detector - Detector notification or frame result
//! - WS /ws/{id} - Live display updates; accepts detector events
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::config::GameConfig;
use crate::core::detector::RemoteDetector;
use crate::core::display::BroadcastDisplay;
use crate::core::session::{spawn_session, GameInput, SessionHandle};
use crate::error::SessionError;
use crate::types::{DetectorEvent, GameStatus, GameUpdate, UserCommand};

/// Buffered display updates per game before slow clients start lagging
const UPDATE_BUFFER: usize = 256;

/// One running game
#[derive(Debug)]
pub struct GameEntry {
    pub handle: SessionHandle,
    pub updates: broadcast::Sender<GameUpdate>,
    pub task: JoinHandle<()>,
}

/// App state
pub struct AppState {
    pub games: RwLock<HashMap<String, GameEntry>>,
    pub config: GameConfig,
}

/// Create new game response
#[derive(Debug, Serialize)]
pub struct NewGameResponse {
    pub game_id: String,
    pub websocket_url: String,
    pub status: GameStatus,
}

/// Button press request
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: UserCommand,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub games_active: usize,
}

/// Create the API router
pub fn create_router(config: GameConfig) -> Router {
    let state = Arc::new(AppState {
        games: RwLock::new(HashMap::new()),
        config,
    });

    Router::new()
        .route("/health", get(health))
        .route("/game/new", post(create_game))
        .route("/game/:id", get(get_game).delete(end_game))
        .route("/game/:id/command", post(send_command))
        .route("/game/:id/detector", post(send_detector_event))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let games = state.games.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        games_active: games.len(),
    })
}

/// Start a new game; the first round begins immediately
async fn create_game(State(state): State<Arc<AppState>>) -> Json<NewGameResponse> {
    let game_id = generate_game_id();
    let (updates, _) = broadcast::channel(UPDATE_BUFFER);

    let (handle, task) = spawn_session(
        &state.config,
        RemoteDetector::new(updates.clone()),
        Box::new(BroadcastDisplay::new(updates.clone())),
    );
    let status = handle.status();
    tracing::info!(%game_id, target = ?status.target, "game created");

    let mut games = state.games.write().await;
    games.insert(game_id.clone(), GameEntry { handle, updates, task });

    Json(NewGameResponse {
        websocket_url: format!("/ws/{}", game_id),
        game_id,
        status,
    })
}

/// Get game status
async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GameStatus>, StatusCode> {
    let handle = lookup(&state, &id).await?;
    Ok(Json(handle.status()))
}

/// End a game and drop its session
async fn end_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let entry = state.games.write().await.remove(&id);
    match entry {
        Some(entry) => {
            // Already closed is fine; it is being removed either way
            let _ = entry.handle.send(GameInput::Shutdown);
            tracing::info!(game_id = %id, "game ended");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Press Start / Stop / Reset
async fn send_command(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<GameStatus>, StatusCode> {
    let handle = lookup(&state, &id).await?;
    let status = handle
        .request(GameInput::Command(req.command))
        .await
        .map_err(session_status)?;
    Ok(Json(status))
}

/// Deliver a detector notification or frame result
async fn send_detector_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(event): Json<DetectorEvent>,
) -> Result<Json<GameStatus>, StatusCode> {
    let handle = lookup(&state, &id).await?;
    let status = handle
        .request(GameInput::Detector(event))
        .await
        .map_err(session_status)?;
    Ok(Json(status))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let games = state.games.read().await;
    let entry = games.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = entry.updates.subscribe();
    let handle = entry.handle.clone();
    drop(games);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx, handle).await;
    }))
}

/// Forward display updates out; accept detector events in
async fn handle_websocket(
    socket: WebSocket,
    mut rx: broadcast::Receiver<GameUpdate>,
    handle: SessionHandle,
) {
    let (mut sender, mut receiver) = socket.split();
    let initial = initial_updates(&handle.status());

    let mut send_task = tokio::spawn(async move {
        for update in initial {
            if send_update(&mut sender, &update).await.is_err() {
                return;
            }
        }
        loop {
            match rx.recv().await {
                Ok(update) => {
                    if send_update(&mut sender, &update).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "websocket client lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => match serde_json::from_str::<DetectorEvent>(&text) {
                    Ok(event) => {
                        if handle.send(GameInput::Detector(event)).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("ignoring websocket message: {}", e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

async fn send_update<S>(sender: &mut S, update: &GameUpdate) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let json = match serde_json::to_string(update) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("failed to encode display update: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(json)).await
}

/// Target and score so a fresh client can draw immediately
fn initial_updates(status: &GameStatus) -> Vec<GameUpdate> {
    let mut updates = Vec::new();
    if let Some(code) = status.target {
        updates.push(GameUpdate::Target {
            code,
            glyph: status.target_glyph.clone(),
        });
    }
    updates.push(GameUpdate::Score {
        correct: status.score.correct,
        total: status.score.total,
    });
    updates
}

async fn lookup(state: &AppState, id: &str) -> Result<SessionHandle, StatusCode> {
    let games = state.games.read().await;
    games
        .get(id)
        .map(|entry| entry.handle.clone())
        .ok_or(StatusCode::NOT_FOUND)
}

fn session_status(err: SessionError) -> StatusCode {
    match err {
        SessionError::Closed => StatusCode::GONE,
    }
}

/// Generate game ID
fn generate_game_id() -> String {
    format!("game_{:016x}", rand::random::<u64>())
}

/// Run the API server
pub async fn run_server(config: GameConfig) -> std::io::Result<()> {
    let addr = config.addr.clone();
    let router = create_router(config);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("mimic API running on {}", addr);
    tracing::info!("  POST   /game/new          - Start game");
    tracing::info!("  GET    /game/:id          - Get status");
    tracing::info!("  DELETE /game/:id          - End game");
    tracing::info!("  POST   /game/:id/command  - Start / Stop / Reset");
    tracing::info!("  POST   /game/:id/detector - Detector event");
    tracing::info!("  WS     /ws/:id            - Live updates");
    tracing::info!("  GET    /health            - Health check");
    axum::serve(listener, router).await
}
