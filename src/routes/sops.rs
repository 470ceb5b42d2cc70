// src/routes/sops.rs

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentSession;
use crate::core::access::ensure_admin;
use crate::errors::ApiError;
use crate::models::{Sop, SopTargetUnit};
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSopsQ {
    pub target_unit: Option<SopTargetUnit>,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SopSource {
    Url { url: String },
    #[serde(rename_all = "camelCase")]
    File { file_name: String, file_url: Option<String> },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSopBody {
    pub title: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    pub target_unit: SopTargetUnit,
    pub source: SopSource,
}
fn default_category() -> String { "Operasional".into() }

/// File name without its last extension: "SOP Start Up.pdf" -> "SOP Start Up".
fn stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(i) if i > 0 => &file_name[..i],
        _ => file_name,
    }
}

/// Builds the stored record for an upload; url uploads need an explicit title.
pub fn build_sop(b: CreateSopBody, id: String, uploader: &str, today: chrono::NaiveDate) -> Result<Sop, ApiError> {
    let given = b.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    let (title, content, file_url) = match b.source {
        SopSource::Url { url } => {
            let url = url.trim().to_string();
            if url.is_empty() {
                return Err(ApiError::Validation("url is required".into()));
            }
            let title = given.ok_or_else(|| ApiError::Validation("title is required".into()))?;
            (title, format!("Dokumen SOP diakses melalui tautan eksternal: {url}."), Some(url))
        }
        SopSource::File { file_name, file_url } => {
            let file_name = file_name.trim().to_string();
            if file_name.is_empty() {
                return Err(ApiError::Validation("fileName is required".into()));
            }
            let title = given.unwrap_or_else(|| stem(&file_name).to_string());
            (title, format!("Konten diekstrak dari file: {file_name}."), file_url)
        }
    };

    Ok(Sop {
        path: Some(format!("sops/{id}")),
        id,
        title,
        category: b.category,
        target_unit: b.target_unit,
        last_updated: today,
        content,
        file_url,
        user_email: Some(uploader.to_string()),
    })
}

// GET /api/v1/sops
pub async fn list_sops(
    State(state): State<AppState>,
    CurrentSession(_session): CurrentSession,
    Query(q): Query<ListSopsQ>,
) -> Result<Json<Vec<Sop>>, (StatusCode, String)> {
    let sops = state.store.list_sops().await.map_err(ApiError::from)?;
    let rows = match q.target_unit {
        Some(tab) => sops.into_iter().filter(|s| s.target_unit == tab).collect(),
        None => sops,
    };
    Ok(Json(rows))
}

// POST /api/v1/sops   (admin)
pub async fn create_sop(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(b): Json<CreateSopBody>,
) -> Result<(StatusCode, Json<Sop>), (StatusCode, String)> {
    ensure_admin(&session)?;
    let sop = build_sop(
        b,
        Uuid::now_v7().to_string(),
        &session.identity.email,
        Utc::now().date_naive(),
    )?;
    state.store.put_sop(&sop).await.map_err(|e| {
        tracing::warn!(id = %sop.id, error = %e, "saving SOP failed");
        ApiError::from(e)
    })?;
    state.feed.publish("sop-created");
    tracing::info!(id = %sop.id, target = sop.target_unit.as_str(), "SOP saved");
    Ok((StatusCode::CREATED, Json(sop)))
}

// DELETE /api/v1/sops/:id   (admin)
pub async fn delete_sop(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    ensure_admin(&session)?;
    let deleted = state.store.delete_sop(&id).await.map_err(|e| {
        tracing::warn!(%id, error = %e, "deleting SOP failed");
        ApiError::from(e)
    })?;
    if !deleted {
        return Err(ApiError::NotFound(format!("SOP {id}")).into());
    }
    state.feed.publish("sop-deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}
