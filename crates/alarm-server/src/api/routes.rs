//! REST API routes.

use std::sync::Arc;

use alarm_core::{AircraftObservation, AlarmSettings, ScanSummary};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::persistence::SettingsUpdateError;
use crate::state::{AlarmStatus, AppState};

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/currentFlights", get(current_flights))
        .route("/api/scanHistory", get(scan_history))
        .route("/api/alarm", get(alarm_status))
        .route("/api/settings", get(get_settings).post(save_settings))
        .route("/api/settings/defaults", post(restore_defaults))
}

async fn current_flights(State(state): State<Arc<AppState>>) -> Json<Vec<AircraftObservation>> {
    Json(state.current_aircraft())
}

async fn scan_history(State(state): State<Arc<AppState>>) -> Json<Vec<ScanSummary>> {
    Json(state.history())
}

async fn alarm_status(State(state): State<Arc<AppState>>) -> Json<AlarmStatus> {
    Json(state.alarm_status())
}

async fn get_settings(State(state): State<Arc<AppState>>) -> Json<AlarmSettings> {
    Json(state.settings().current())
}

async fn save_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<AlarmSettings>,
) -> impl IntoResponse {
    let sound_enabled = settings.sound_warning;

    match state.settings().update(settings).await {
        Ok(warnings) => {
            // Disabling sound cuts off a clip that is already playing.
            if !sound_enabled {
                state.stop_audio();
            }
            for warning in &warnings {
                tracing::warn!("Settings accepted with warning: {}", warning);
            }
            let warnings: Vec<String> = warnings.iter().map(ToString::to_string).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "message": "Settings saved!",
                    "warnings": warnings,
                })),
            )
        }
        Err(SettingsUpdateError::Invalid(err)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": err.to_string() })),
        ),
        Err(err) => {
            tracing::error!("Failed to save settings: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": err.to_string() })),
            )
        }
    }
}

async fn restore_defaults(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.settings().reset_to_defaults().await {
        Ok(defaults) => {
            tracing::info!("Settings restored to defaults");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "message": "Defaults restored",
                    "settings": defaults,
                })),
            )
        }
        Err(err) => {
            tracing::error!("Failed to restore default settings: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": err.to_string() })),
            )
        }
    }
}
