// src/routes/shift_entry.rs

use axum::{extract::Query, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::core::entry::{applicable_items, LoadInput};
use crate::errors::ApiError;
use crate::models::{ChecklistItem, Shift, UnitGroup};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistQ {
    pub shift: Shift,
    pub unit_group: UnitGroup,
}

#[derive(Serialize)]
pub struct ChecklistField {
    pub key: ChecklistItem,
    pub label: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistTemplate {
    pub shift: Shift,
    pub unit_group: UnitGroup,
    pub items: Vec<ChecklistField>,
}

// GET /api/v1/shift-entry/checklist?shift=Pagi&unitGroup=Unit%201-2
pub async fn checklist_template(Query(q): Query<ChecklistQ>) -> Json<ChecklistTemplate> {
    let items = applicable_items(q.shift, q.unit_group)
        .into_iter()
        .map(|key| ChecklistField { key, label: key.label() })
        .collect();
    Json(ChecklistTemplate { shift: q.shift, unit_group: q.unit_group, items })
}

#[derive(Deserialize)]
pub struct NormalizeBody {
    pub value: LoadInput,
}

// POST /api/v1/shift-entry/normalize-load
pub async fn normalize_load(
    Json(b): Json<NormalizeBody>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match b.value.on_blur() {
        LoadInput::Value(v) => Ok(Json(serde_json::json!({ "value": v }))),
        LoadInput::Empty => Err(ApiError::Validation("value is empty".into()).into()),
    }
}
