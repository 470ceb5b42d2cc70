// src/routes/auth.rs

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{self, CurrentSession};
use crate::models::{Identity, SessionInfo};
use crate::AppState;

#[derive(Deserialize)]
pub struct SignInBody {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResp {
    pub token: String,
    pub identity: Identity,
    pub is_admin: bool,
}

// POST /api/v1/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(b): Json<SignInBody>,
) -> Result<Json<SignInResp>, (StatusCode, String)> {
    let session = auth::sign_in(state.store.as_ref(), &b.email, &b.password).await?;
    state.feed.publish("sign-in");
    Ok(Json(SignInResp {
        is_admin: session.role.is_admin(),
        token: session.token,
        identity: session.identity,
    }))
}

// POST /api/v1/auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let removed = state
        .store
        .delete_session(&session.token)
        .await
        .map_err(crate::errors::ApiError::from)?;
    // live subscriptions bound to this token close on the next revision
    state.feed.publish("sign-out");
    tracing::info!(uid = %session.identity.uid, "signed out");
    Ok(Json(serde_json::json!({ "signedOut": removed })))
}

// GET /api/v1/auth/me
pub async fn me(CurrentSession(session): CurrentSession) -> Json<SessionInfo> {
    Json(SessionInfo::from(&session))
}
