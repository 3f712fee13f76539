//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    error::ReminderError,
    state::{AppState, IntervalInput, NormalizedInput},
};
use super::responses::{
    ApiResponse, HealthResponse, PopupCloseResponse, PopupResponse, SettingsResponse,
    StatusResponse,
};

fn status_code_for(e: &ReminderError) -> StatusCode {
    if e.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Handle POST /start - Commit the fields and start the reminder
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<IntervalInput>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start(&input).await {
        Ok(scheduler) => {
            info!("Start endpoint called - reminder active");
            let message = format!(
                "Reminder started! First popup in {} minutes and {} seconds.",
                scheduler.config.minutes, scheduler.config.seconds
            );
            Ok(Json(ApiResponse::active(message, scheduler)))
        }
        Err(e) => {
            warn!("Failed to start reminder: {}", e);
            Err(status_code_for(&e))
        }
    }
}

/// Handle POST /stop - Stop the reminder and close any popup
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.stop().await {
        Ok(scheduler) => {
            info!("Stop endpoint called - reminder inactive");
            Ok(Json(ApiResponse::inactive(
                "Reminder stopped!".to_string(),
                scheduler,
            )))
        }
        Err(e) => {
            error!("Failed to stop reminder: {}", e);
            Err(status_code_for(&e))
        }
    }
}

/// Handle PUT /config - Commit an edited field
pub async fn update_config_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<IntervalInput>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.update_config(&input).await {
        Ok(scheduler) => {
            let message = if scheduler.active {
                format!(
                    "Timer updated: Next popup in {} minutes and {} seconds.",
                    scheduler.config.minutes, scheduler.config.seconds
                )
            } else {
                "Settings saved".to_string()
            };
            Ok(Json(ApiResponse::from_scheduler(message, scheduler)))
        }
        Err(e) => {
            warn!("Failed to update reminder config: {}", e);
            Err(status_code_for(&e))
        }
    }
}

/// Handle POST /normalize - What the fields show after losing focus
pub async fn normalize_handler(Json(input): Json<IntervalInput>) -> Json<NormalizedInput> {
    Json(input.normalized())
}

/// Handle GET /settings - Current field values
pub async fn settings_handler(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    Json(state.scheduler_status().config.into())
}

/// Handle GET /popup - The open popup's display data
pub async fn popup_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PopupResponse>, StatusCode> {
    state
        .window_status()
        .popup
        .map(|popup| Json(popup.into()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Handle POST /popup/close - The popup's close button
pub async fn popup_close_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PopupCloseResponse>, StatusCode> {
    match state.close_popup() {
        Ok(closed) => {
            if let Some(id) = closed {
                info!("Popup close endpoint called - closing popup {}", id);
            }
            Ok(Json(PopupCloseResponse { closed }))
        }
        Err(e) => {
            error!("Failed to close popup: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current reminder status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        scheduler: state.scheduler_status(),
        window: state.window_status(),
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
