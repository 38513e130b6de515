//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::{
    error::TimerError,
    state::{AppState, DurationSelection, PickerRanges},
};
use super::responses::{ApiResponse, DurationRequest, HealthResponse, StatusResponse};

type ApiResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

fn status_for(error: &TimerError) -> StatusCode {
    match error {
        TimerError::InvalidDuration | TimerError::OutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TimerError::NotIdle => StatusCode::CONFLICT,
    }
}

async fn reject(state: &AppState, error: TimerError) -> (StatusCode, Json<ApiResponse>) {
    warn!("Rejected request: {}", error);
    let timer = state.get_snapshot().await;
    (status_for(&error), Json(ApiResponse::error(error.to_string(), timer)))
}

/// Handle POST /duration - Set hours, minutes and seconds for the next start
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> ApiResult {
    let selection = match DurationSelection::new(request.hours, request.minutes, request.seconds) {
        Ok(selection) => selection,
        Err(e) => return Err(reject(&state, e).await),
    };

    match state.set_duration(selection).await {
        Ok(timer) => {
            info!("Duration endpoint called - {:?}", selection);
            Ok(Json(ApiResponse::ok("Duration updated".to_string(), timer)))
        }
        Err(e) => Err(reject(&state, e).await),
    }
}

/// Handle POST /start - Start the countdown and the music
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    match state.start().await {
        Ok(timer) => {
            info!("Start endpoint called - counting down from {}", timer.display);
            Ok(Json(ApiResponse::ok("Timer started".to_string(), timer)))
        }
        Err(e) => Err(reject(&state, e).await),
    }
}

/// Handle POST /reset - Stop the countdown and the music, restore defaults
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.reset().await;
    info!("Reset endpoint called");
    Json(ApiResponse::ok("Timer reset".to_string(), timer))
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timer = state.get_snapshot().await;
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /ranges - Values offered by the duration pickers
pub async fn ranges_handler() -> Json<PickerRanges> {
    Json(PickerRanges::new())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
