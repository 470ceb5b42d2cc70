// src/routes/shift_logs.rs

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentSession;
use crate::core::access::{ensure_can_create_log, ensure_can_delete_log, LogScope};
use crate::core::entry::ShiftDraft;
use crate::core::history::HistoryFilter;
use crate::errors::ApiError;
use crate::models::ShiftLog;
use crate::AppState;
use super::optional_day;

#[derive(Deserialize)]
pub struct ListLogsQ {
    pub q: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

// GET /api/v1/shift-logs
pub async fn list_logs(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(q): Query<ListLogsQ>,
) -> Result<Json<Vec<ShiftLog>>, (StatusCode, String)> {
    let filter = HistoryFilter::new(
        q.q.as_deref().unwrap_or(""),
        optional_day(q.start.as_deref())?,
        optional_day(q.end.as_deref())?,
    );
    let logs = state
        .store
        .list_logs(LogScope::for_session(&session))
        .await
        .map_err(ApiError::from)?;
    Ok(Json(filter.apply(logs)))
}

// GET /api/v1/shift-logs/:id
pub async fn get_log(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<ShiftLog>, (StatusCode, String)> {
    let log = state
        .store
        .get_log(&id)
        .await
        .map_err(ApiError::from)?
        .filter(|l| LogScope::for_session(&session).admits(l))
        .ok_or_else(|| ApiError::NotFound(format!("shift log {id}")))?;
    Ok(Json(log))
}

// POST /api/v1/shift-logs
pub async fn create_log(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(draft): Json<ShiftDraft>,
) -> Result<(StatusCode, Json<ShiftLog>), (StatusCode, String)> {
    ensure_can_create_log(&session)?;

    let mut log = draft
        .assemble(Uuid::now_v7().to_string(), Utc::now())
        .map_err(ApiError::from)?;
    log.created_by = Some(session.identity.uid);
    log.user_email = Some(session.identity.email.clone());

    state.store.put_log(&log).await.map_err(|e| {
        tracing::warn!(id = %log.id, error = %e, "saving shift log failed");
        ApiError::from(e)
    })?;
    state.feed.publish("shift-log-created");
    tracing::info!(id = %log.id, unit_group = log.unit_group.as_str(), shift = log.shift.as_str(), "shift log saved");

    Ok((StatusCode::CREATED, Json(log)))
}

// DELETE /api/v1/shift-logs/:id
pub async fn delete_log(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let log = state
        .store
        .get_log(&id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("shift log {id}")))?;
    ensure_can_delete_log(&session, &log)?;

    let deleted = state.store.delete_log(&id).await.map_err(|e| {
        tracing::warn!(%id, error = %e, "deleting shift log failed");
        ApiError::from(e)
    })?;
    if deleted {
        state.feed.publish("shift-log-deleted");
    }
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
