// src/routes/advisory.rs

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{self, CurrentSession};
use crate::errors::ApiError;
use crate::models::{Session, UnitId};
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    pub notes: String,
    pub unit_id: UnitId,
}

#[derive(Deserialize)]
pub struct AskBody {
    pub question: String,
}

#[derive(Serialize)]
pub struct AdvisoryResp {
    pub text: String,
}

/// Drops a result whose session ended while the model was answering.
async fn still_signed_in(state: &AppState, session: &Session) -> Result<(), ApiError> {
    auth::session_for_token(state.store.as_ref(), &session.token)
        .await
        .map(|_| ())
}

// POST /api/v1/advisory/analyze
pub async fn analyze(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(b): Json<AnalyzeBody>,
) -> Result<Json<AdvisoryResp>, (StatusCode, String)> {
    if b.notes.trim().is_empty() {
        return Err(ApiError::Validation("notes are empty".into()).into());
    }
    let text = state.advisory.analyze_shift_note(&b.notes, b.unit_id).await;
    still_signed_in(&state, &session).await?;
    Ok(Json(AdvisoryResp { text }))
}

// POST /api/v1/advisory/ask
pub async fn ask(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(b): Json<AskBody>,
) -> Result<Json<AdvisoryResp>, (StatusCode, String)> {
    if b.question.trim().is_empty() {
        return Err(ApiError::Validation("question is empty".into()).into());
    }
    let text = state.advisory.ask_sop(&b.question).await;
    still_signed_in(&state, &session).await?;
    Ok(Json(AdvisoryResp { text }))
}
