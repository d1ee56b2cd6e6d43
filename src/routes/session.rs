//! Read-only session snapshot over HTTP.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::error;

use crate::state::{AppState, SessionState};

/// `GET /api/session` — current phase, apparatus, and play state.
pub async fn get_session(State(state): State<AppState>) -> Result<Json<SessionState>, StatusCode> {
    match state.session.snapshot().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!(error = %e, "session snapshot failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
