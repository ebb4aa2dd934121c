//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    state::{AppState, Button, Intent},
    tasks::{InputReply, UserInput},
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

async fn submit(
    state: &AppState,
    action: &str,
    input: UserInput,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    match state.submit(action, input).await {
        Ok(InputReply { status: nap, failure }) => {
            info!("{} -> {} ({})", action, nap.mode, nap.headline());
            let response = match failure {
                Some(failure) => ApiResponse::failed(failure, nap),
                None => ApiResponse::accepted(format!("{} applied", action), nap),
            };
            Ok((StatusCode::ACCEPTED, Json(response)))
        }
        Err(e) => {
            error!("Failed to apply {}: {}", action, e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /button/:name - Physical button press, mapped by the current mode
pub async fn button_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    let button = Button::from_name(&name).ok_or(StatusCode::NOT_FOUND)?;
    submit(&state, &format!("button-{}", name), UserInput::Press(button)).await
}

/// Handle POST /increment - Lengthen the nap (dismisses a running alarm)
pub async fn increment_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    submit(&state, "increment", UserInput::Intent(Intent::Increment)).await
}

/// Handle POST /decrement - Shorten the nap (dismisses a running alarm)
pub async fn decrement_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    submit(&state, "decrement", UserInput::Intent(Intent::Decrement)).await
}

/// Handle POST /toggle - Start or cancel the nap (dismisses a running alarm)
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    submit(&state, "toggle", UserInput::Intent(Intent::Toggle)).await
}

/// Handle POST /dismiss - Stop a running alarm
pub async fn dismiss_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    submit(&state, "dismiss", UserInput::Intent(Intent::Dismiss)).await
}

/// Handle GET /status - Return current nap status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let nap = state.get_status();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        headline: nap.headline(),
        nap,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
