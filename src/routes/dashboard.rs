// src/routes/dashboard.rs

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::CurrentSession;
use crate::core::access::LogScope;
use crate::core::aggregate::{self, Dashboard};
use crate::errors::ApiError;
use crate::AppState;

// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Dashboard>, (StatusCode, String)> {
    let logs = state
        .store
        .list_logs(LogScope::for_session(&session))
        .await
        .map_err(ApiError::from)?;
    Ok(Json(aggregate::dashboard(&logs)))
}
