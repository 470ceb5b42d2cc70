// src/core/history.rs

use chrono::NaiveDate;

use crate::models::ShiftLog;

/// Text + inclusive date-range filter for the history view. Display only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    query: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn new(query: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        HistoryFilter {
            query: query.to_lowercase(),
            start,
            end,
        }
    }

    fn matches_text(&self, log: &ShiftLog) -> bool {
        if self.query.is_empty() {
            return true;
        }
        [
            log.group_name.as_str(),
            log.unit_group.as_str(),
            log.user_email.as_deref().unwrap_or(""),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&self.query))
    }

    fn matches_date(&self, log: &ShiftLog) -> bool {
        let day = log.date.date_naive();
        self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
    }

    pub fn matches(&self, log: &ShiftLog) -> bool {
        self.matches_text(log) && self.matches_date(log)
    }

    /// Keeps the input order.
    pub fn apply(&self, logs: Vec<ShiftLog>) -> Vec<ShiftLog> {
        logs.into_iter().filter(|l| self.matches(l)).collect()
    }
}
