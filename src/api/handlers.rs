//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{debug, error, info};

use super::responses::{
    AdjustRequest, ApiResponse, HealthResponse, SetRequest, SettingsResponse, SoundResponse,
    StatusResponse, VisibilityRequest,
};
use crate::state::{AppState, EditError, Setting, ToggleAction, WorkoutConfig};

type ApiError = (StatusCode, Json<ApiResponse>);

fn internal_error(context: &str, e: String) -> ApiError {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(format!("{}: {}", context, e))),
    )
}

/// Handle POST /start - Start or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    match state.start() {
        Ok((true, display)) => {
            info!("Start endpoint called - timer running");
            Ok(Json(ApiResponse::ok("Timer running".to_string(), display)))
        }
        Ok((false, display)) => Ok(Json(ApiResponse::ignored(
            "Timer is already running or has nothing to run".to_string(),
            display,
        ))),
        Err(e) => Err(internal_error("Failed to start timer", e)),
    }
}

/// Handle POST /pause - Pause a running countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    match state.pause() {
        Ok((true, display)) => {
            info!("Pause endpoint called - timer paused");
            Ok(Json(ApiResponse::ok("Timer paused".to_string(), display)))
        }
        Ok((false, display)) => Ok(Json(ApiResponse::ignored(
            "Timer is not running".to_string(),
            display,
        ))),
        Err(e) => Err(internal_error("Failed to pause timer", e)),
    }
}

/// Handle POST /toggle - Start/pause button
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    match state.toggle() {
        Ok((ToggleAction::Started, display)) => Ok(Json(ApiResponse::ok("Timer running".to_string(), display))),
        Ok((ToggleAction::Paused, display)) => Ok(Json(ApiResponse::ok("Timer paused".to_string(), display))),
        Ok((ToggleAction::Ignored, display)) => Ok(Json(ApiResponse::ignored(
            "Nothing to run".to_string(),
            display,
        ))),
        Err(e) => Err(internal_error("Failed to toggle timer", e)),
    }
}

/// Handle POST /reset - Return to the first segment
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    match state.reset() {
        Ok(display) => {
            info!("Reset endpoint called");
            Ok(Json(ApiResponse::ok("Timer reset".to_string(), display)))
        }
        Err(e) => Err(internal_error("Failed to reset timer", e)),
    }
}

/// Handle POST /visibility - Client came back to the foreground
pub async fn visibility_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VisibilityRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    if request.hidden {
        debug!("Client hidden, nothing to do");
    } else if let Err(e) = state.resync() {
        return Err(internal_error("Failed to resync display", e));
    }

    match state.get_display() {
        Ok(display) => Ok(Json(ApiResponse::ok("Visibility noted".to_string(), display))),
        Err(e) => Err(internal_error("Failed to get display", e)),
    }
}

/// Handle POST /sound/toggle - Flip the sound flag
pub async fn sound_toggle_handler(State(state): State<Arc<AppState>>) -> Json<SoundResponse> {
    let sound_enabled = state.cues.toggle();
    info!("Sound {}", if sound_enabled { "enabled" } else { "disabled" });
    Json(SoundResponse {
        sound_enabled,
        timestamp: Utc::now(),
    })
}

/// Handle GET /settings - Current configuration and ranges
pub async fn settings_handler(State(state): State<Arc<AppState>>) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = state
        .get_config()
        .map_err(|e| internal_error("Failed to get settings", e))?;
    let summary = state
        .get_summary()
        .map_err(|e| internal_error("Failed to get summary", e))?;
    Ok(Json(SettingsResponse::new(settings, summary)))
}

/// Handle POST /settings/:key/adjust - Step a setting up or down
pub async fn adjust_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(request): Json<AdjustRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let setting = parse_setting(&key)?;
    settings_edit_response(&state, state.adjust_setting(setting, request.direction))
}

/// Handle PUT /settings/:key - Set a setting to a value
pub async fn set_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(request): Json<SetRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let setting = parse_setting(&key)?;
    settings_edit_response(&state, state.set_setting(setting, request.value))
}

fn parse_setting(key: &str) -> Result<Setting, ApiError> {
    key.parse()
        .map_err(|e: String| (StatusCode::NOT_FOUND, Json(ApiResponse::error(e))))
}

fn settings_edit_response(
    state: &AppState,
    result: Result<WorkoutConfig, EditError>,
) -> Result<Json<SettingsResponse>, ApiError> {
    match result {
        Ok(settings) => {
            let summary = state
                .get_summary()
                .map_err(|e| internal_error("Failed to get summary", e))?;
            Ok(Json(SettingsResponse::new(settings, summary)))
        }
        Err(EditError::Locked(e)) => Err((
            StatusCode::LOCKED,
            Json(ApiResponse::locked(e.to_string(), state.get_display().ok())),
        )),
        Err(EditError::Internal(e)) => Err(internal_error("Failed to edit setting", e)),
    }
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let display = state
        .get_display()
        .map_err(|e| internal_error("Failed to get display", e))?;
    let summary = state
        .get_summary()
        .map_err(|e| internal_error("Failed to get summary", e))?;
    let settings = state
        .get_config()
        .map_err(|e| internal_error("Failed to get settings", e))?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        display,
        summary,
        settings,
        sound_enabled: state.cues.is_enabled(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
