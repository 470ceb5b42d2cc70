// src/routes/mod.rs

use chrono::NaiveDate;

use crate::errors::ApiError;

pub mod advisory;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod live;
pub mod shift_entry;
pub mod shift_logs;
pub mod sops;
pub mod users;

pub fn parse_day(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .map_err(|e| ApiError::Validation(format!("invalid date '{s}': {e}")))
}

/// Blank query parameters (`?start=`) count as absent.
pub fn optional_day(s: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(day) => parse_day(day).map(Some),
    }
}
