// src/routes/users.rs

use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, CurrentSession};
use crate::core::access::ensure_admin;
use crate::errors::ApiError;
use crate::models::{Identity, Role};
use crate::AppState;

#[derive(Deserialize)]
pub struct CreateUserBody {
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}
fn default_role() -> Role { Role::Operator }

#[derive(Deserialize)]
pub struct PatchRoleBody {
    pub role: Role,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResp {
    pub identity: Identity,
    pub role: Role,
}

// POST /api/v1/users   (admin)
pub async fn create_user(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(b): Json<CreateUserBody>,
) -> Result<Json<UserResp>, (StatusCode, String)> {
    ensure_admin(&session)?;
    let identity = auth::create_user(state.store.as_ref(), &b.email, &b.password, b.role).await?;
    tracing::info!(uid = %identity.uid, role = b.role.as_str(), by = %session.identity.uid, "user created");
    Ok(Json(UserResp { identity, role: b.role }))
}

// PATCH /api/v1/users/:id/role   (admin)
pub async fn patch_role(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<Uuid>,
    Json(b): Json<PatchRoleBody>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    ensure_admin(&session)?;
    state.store.set_profile_role(id, b.role).await.map_err(ApiError::from)?;
    let rebound = state
        .store
        .update_session_roles(id, b.role)
        .await
        .map_err(ApiError::from)?;
    if rebound > 0 {
        // open subscriptions of those sessions must drop their old scope
        state.feed.publish("role-change");
    }
    tracing::info!(uid = %id, role = b.role.as_str(), rebound, "role updated");
    Ok(Json(serde_json::json!({ "updated": true, "sessionsRebound": rebound })))
}
