use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use crate::agent::config::Config;
use crate::media::{Action, ActionReport, BridgeError, MediaBridge};

type SharedState = Arc<AppState>;

/// Body returned for every accepted action
pub const ACTION_ACK: &str = "Okay. Go back <a href='/'>home</a>";

#[derive(Debug, Clone)]
pub struct AppState {
    pub bridge: MediaBridge,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            bridge: MediaBridge::new(config),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

fn status_code_for(err: &BridgeError) -> StatusCode {
    match err {
        BridgeError::Spawn { .. } | BridgeError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        BridgeError::Parse(_)
        | BridgeError::NotAnObject(_)
        | BridgeError::OutputTooLarge { .. } => StatusCode::BAD_GATEWAY,
        BridgeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        BridgeError::UnknownAction(_) => StatusCode::BAD_REQUEST,
    }
}

fn error_response(err: BridgeError) -> Response {
    let code = status_code_for(&err);
    error!(status = code.as_u16(), "bridge error: {}", err);
    (
        code,
        Json(ErrorResponse {
            error: err.to_string(),
            exit_code: None,
        }),
    )
        .into_response()
}

// Health check
async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok", "version": crate::VERSION}))
}

async fn run_action(state: &AppState, action: Action) -> Response {
    info!("Trying to {}", action);
    match state.bridge.perform(action).await {
        Ok(ActionReport::Completed(outcome)) if !outcome.success => {
            warn!(%action, exit_code = ?outcome.exit_code, "media-control reported failure");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("{} failed", action),
                    exit_code: outcome.exit_code,
                }),
            )
                .into_response()
        }
        Ok(_) => Html(ACTION_ACK).into_response(),
        Err(e) => error_response(e),
    }
}

// Action named by the path: play, pause, next, prev or previous
async fn action_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Response {
    match name.parse::<Action>() {
        Ok(action) => run_action(&state, action).await,
        Err(e) => error_response(e),
    }
}

// Currently playing item, passed through verbatim
async fn current_status(State(state): State<SharedState>) -> Response {
    match state.bridge.status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => error_response(e),
    }
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(current_status))
        .route("/status", get(current_status))
        .route("/curplay", get(current_status))
        .route("/cur", get(current_status))
        .route("/playing", get(current_status))
        .route("/{action}", get(action_handler))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, stopping server");
}

pub async fn serve(config: Config) -> Result<()> {
    let addr: SocketAddr = config.socket_addr();
    info!(
        version = crate::VERSION,
        executable = %config.executable.display(),
        await_action_exit = config.await_action_exit,
        "media bridge configured"
    );

    let state = Arc::new(AppState::new(&config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Running app at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future()
        .await?;
    Ok(())
}
