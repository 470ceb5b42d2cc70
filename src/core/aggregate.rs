// src/core/aggregate.rs
//
// Dashboard figures derived from the visible shift logs.

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{OfflineReason, ShiftLog, UnitId};

pub const PLANT_UNITS: [UnitId; 4] = [UnitId::Unit1, UnitId::Unit2, UnitId::Unit3, UnitId::Unit4];

pub const SERIES_DAYS: i64 = 7;

const WEEKDAY_LABELS: [&str; 7] = ["Min", "Sen", "Sel", "Rab", "Kam", "Jum", "Sab"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatus {
    pub unit_id: UnitId,
    pub is_online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_reason: Option<OfflineReason>,
    pub load_current: f64,
    pub load_lowest: f64,
    pub load_highest: f64,
    /// Date of the log the status came from; `None` when never reported.
    pub reported_at: Option<DateTime<Utc>>,
}

impl UnitStatus {
    fn unreported(unit_id: UnitId) -> Self {
        UnitStatus {
            unit_id,
            is_online: false,
            offline_reason: None,
            load_current: 0.0,
            load_lowest: 0.0,
            load_highest: 0.0,
            reported_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOutput {
    pub label: &'static str,
    pub value: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub units: Vec<UnitStatus>,
    pub total_load: f64,
    pub series: Vec<DailyOutput>,
    pub total_shifts: usize,
}

/// Newest first. Logs sharing a timestamp fall back to id descending; ids are
/// time-ordered, so the later submission wins.
fn newest_first(a: &ShiftLog, b: &ShiftLog) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
}

pub fn sort_newest_first(logs: &mut [ShiftLog]) {
    logs.sort_by(newest_first);
}

fn sorted_refs(logs: &[ShiftLog]) -> Vec<&ShiftLog> {
    let mut refs: Vec<&ShiftLog> = logs.iter().collect();
    refs.sort_by(|a, b| newest_first(a, b));
    refs
}

fn status_in(sorted: &[&ShiftLog], unit_id: UnitId) -> UnitStatus {
    sorted
        .iter()
        .find_map(|log| {
            log.entries
                .iter()
                .find(|e| e.unit_id == unit_id)
                .map(|e| UnitStatus {
                    unit_id,
                    is_online: e.is_online(),
                    offline_reason: e.state.offline_reason(),
                    load_current: e.load_current,
                    load_lowest: e.load_lowest,
                    load_highest: e.load_highest,
                    reported_at: Some(log.date),
                })
        })
        .unwrap_or_else(|| UnitStatus::unreported(unit_id))
}

/// Last reported state of `unit_id`, or an offline zero-load default.
pub fn latest_unit_status(logs: &[ShiftLog], unit_id: UnitId) -> UnitStatus {
    status_in(&sorted_refs(logs), unit_id)
}

pub fn latest_statuses(logs: &[ShiftLog]) -> Vec<UnitStatus> {
    let sorted = sorted_refs(logs);
    PLANT_UNITS.iter().map(|&u| status_in(&sorted, u)).collect()
}

/// Sum of current load over the latest status of every plant unit that is online.
pub fn total_current_load(logs: &[ShiftLog]) -> f64 {
    sum_online(&latest_statuses(logs))
}

fn sum_online(statuses: &[UnitStatus]) -> f64 {
    statuses
        .iter()
        .filter(|s| s.is_online)
        .map(|s| s.load_current)
        .sum()
}

/// Daily output for the 7 calendar days (UTC) ending on the newest log's day.
/// Every log of a day counts, not just the latest one.
pub fn seven_day_series(logs: &[ShiftLog]) -> Vec<DailyOutput> {
    let Some(anchor) = logs.iter().max_by(|a, b| newest_first(b, a)) else {
        return Vec::new();
    };
    let anchor_day = anchor.date.date_naive();

    (0..SERIES_DAYS)
        .rev()
        .map(|back| {
            let day = anchor_day - Duration::days(back);
            let value = logs
                .iter()
                .filter(|log| log.date.date_naive() == day)
                .flat_map(|log| log.entries.iter())
                .map(|e| e.effective_load())
                .sum::<f64>();
            DailyOutput {
                label: WEEKDAY_LABELS[day.weekday().num_days_from_sunday() as usize],
                value,
                date: day,
            }
        })
        .collect()
}

pub fn dashboard(logs: &[ShiftLog]) -> Dashboard {
    let units = latest_statuses(logs);
    Dashboard {
        total_load: sum_online(&units),
        units,
        series: seven_day_series(logs),
        total_shifts: logs.len(),
    }
}
