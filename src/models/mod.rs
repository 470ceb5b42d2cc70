// src/models/mod.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ───────────────────────────────────────
// Plant vocabulary
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    #[serde(alias = "Morning")]
    Pagi,
    #[serde(alias = "Afternoon")]
    Sore,
    #[serde(alias = "Night")]
    Malam,
}

impl Shift {
    pub fn as_str(self) -> &'static str {
        match self {
            Shift::Pagi => "Pagi",
            Shift::Sore => "Sore",
            Shift::Malam => "Malam",
        }
    }

    pub fn is_morning(self) -> bool {
        self == Shift::Pagi
    }
}

impl FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pagi" | "Morning" => Ok(Shift::Pagi),
            "Sore" | "Afternoon" => Ok(Shift::Sore),
            "Malam" | "Night" => Ok(Shift::Malam),
            other => Err(format!("unknown shift '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitId {
    #[serde(rename = "Unit 1")]
    Unit1,
    #[serde(rename = "Unit 2")]
    Unit2,
    #[serde(rename = "Unit 3")]
    Unit3,
    #[serde(rename = "Unit 4")]
    Unit4,
}

impl UnitId {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitId::Unit1 => "Unit 1",
            UnitId::Unit2 => "Unit 2",
            UnitId::Unit3 => "Unit 3",
            UnitId::Unit4 => "Unit 4",
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitGroup {
    #[serde(rename = "Unit 1-2")]
    Unit12,
    #[serde(rename = "Unit 3-4")]
    Unit34,
}

impl UnitGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitGroup::Unit12 => "Unit 1-2",
            UnitGroup::Unit34 => "Unit 3-4",
        }
    }

    /// The fixed pair of generating units a report for this group covers.
    pub fn units(self) -> [UnitId; 2] {
        match self {
            UnitGroup::Unit12 => [UnitId::Unit1, UnitId::Unit2],
            UnitGroup::Unit34 => [UnitId::Unit3, UnitId::Unit4],
        }
    }
}

impl FromStr for UnitGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Unit 1-2" => Ok(UnitGroup::Unit12),
            "Unit 3-4" => Ok(UnitGroup::Unit34),
            other => Err(format!("unknown unit group '{other}'")),
        }
    }
}

// ───────────────────────────────────────
// Unit entries (embedded in a shift log)
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfflineReason {
    Standby,
    Maintenance,
}

/// Online, or offline for a known reason. `isOnline` and `offlineReason`
/// on the wire are both derived from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Online,
    Offline(OfflineReason),
}

impl UnitState {
    pub fn is_online(self) -> bool {
        matches!(self, UnitState::Online)
    }

    pub fn offline_reason(self) -> Option<OfflineReason> {
        match self {
            UnitState::Online => None,
            UnitState::Offline(reason) => Some(reason),
        }
    }

    /// Rebuilds the state from the two wire fields. Offline records that
    /// predate the reason field read back as Standby.
    pub fn from_wire(is_online: bool, reason: Option<OfflineReason>) -> Self {
        if is_online {
            UnitState::Online
        } else {
            UnitState::Offline(reason.unwrap_or(OfflineReason::Standby))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UnitEntryWire", into = "UnitEntryWire")]
pub struct UnitEntry {
    pub unit_id: UnitId,
    pub state: UnitState,
    pub load_current: f64,
    pub load_lowest: f64,
    pub load_highest: f64,
    pub notes: String,
}

impl UnitEntry {
    pub fn is_online(&self) -> bool {
        self.state.is_online()
    }

    /// Load this entry contributes to plant output; offline units count as zero.
    pub fn effective_load(&self) -> f64 {
        if self.is_online() {
            self.load_current
        } else {
            0.0
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitEntryWire {
    unit_id: UnitId,
    is_online: bool,
    #[serde(default)]
    load_current: f64,
    #[serde(default)]
    load_lowest: f64,
    #[serde(default)]
    load_highest: f64,
    #[serde(default)]
    notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offline_reason: Option<OfflineReason>,
}

impl From<UnitEntryWire> for UnitEntry {
    fn from(w: UnitEntryWire) -> Self {
        UnitEntry {
            unit_id: w.unit_id,
            state: UnitState::from_wire(w.is_online, w.offline_reason),
            load_current: w.load_current,
            load_lowest: w.load_lowest,
            load_highest: w.load_highest,
            notes: w.notes,
        }
    }
}

impl From<UnitEntry> for UnitEntryWire {
    fn from(e: UnitEntry) -> Self {
        UnitEntryWire {
            unit_id: e.unit_id,
            is_online: e.state.is_online(),
            load_current: e.load_current,
            load_lowest: e.load_lowest,
            load_highest: e.load_highest,
            notes: e.notes,
            offline_reason: e.state.offline_reason(),
        }
    }
}

// ───────────────────────────────────────
// Checklist
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChecklistItem {
    #[serde(rename = "pemanasanEDG")]
    PemanasanEdg,
    Housekeeping,
    PemanasanFirefighting,
    DrainKompresor,
    DrainSeparator,
    PurifierOliUnit1,
    EngkolManualTurbinUnit1,
    PurifierOliUnit2,
    EngkolManualTurbinUnit2,
    #[serde(rename = "penambahanNaOHUnit3")]
    PenambahanNaohUnit3,
    #[serde(rename = "penambahanNaOHUnit4")]
    PenambahanNaohUnit4,
}

impl ChecklistItem {
    pub fn label(self) -> &'static str {
        match self {
            ChecklistItem::PemanasanEdg => "Pemanasan EDG",
            ChecklistItem::Housekeeping => "Housekeeping",
            ChecklistItem::PemanasanFirefighting => "Pemanasan Firefighting",
            ChecklistItem::DrainKompresor => "Drain Kompresor",
            ChecklistItem::DrainSeparator => "Drain Separator",
            ChecklistItem::PurifierOliUnit1 => "Purifier Oli U1",
            ChecklistItem::EngkolManualTurbinUnit1 => "Engkol Turbin U1",
            ChecklistItem::PurifierOliUnit2 => "Purifier Oli U2",
            ChecklistItem::EngkolManualTurbinUnit2 => "Engkol Turbin U2",
            ChecklistItem::PenambahanNaohUnit3 => "Tambah NaOH U3",
            ChecklistItem::PenambahanNaohUnit4 => "Tambah NaOH U4",
        }
    }
}

/// Only the items that apply to the log's (shift, unit group) are present.
pub type Checklist = BTreeMap<ChecklistItem, bool>;

// ───────────────────────────────────────
// Shift log
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftLog {
    pub id: String,
    pub date: DateTime<Utc>,
    pub shift: Shift,
    pub group_name: String,
    pub unit_group: UnitGroup,
    pub entries: Vec<UnitEntry>,
    #[serde(default)]
    pub checklist: Checklist,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

// ───────────────────────────────────────
// SOP documents
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SopTargetUnit {
    #[serde(rename = "Unit 1-2")]
    Unit12,
    #[serde(rename = "Unit 3-4")]
    Unit34,
    Umum,
}

impl SopTargetUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            SopTargetUnit::Unit12 => "Unit 1-2",
            SopTargetUnit::Unit34 => "Unit 3-4",
            SopTargetUnit::Umum => "Umum",
        }
    }
}

impl FromStr for SopTargetUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Unit 1-2" => Ok(SopTargetUnit::Unit12),
            "Unit 3-4" => Ok(SopTargetUnit::Unit34),
            "Umum" => Ok(SopTargetUnit::Umum),
            other => Err(format!("unknown SOP target unit '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sop {
    pub id: String,
    pub title: String,
    pub category: String,
    pub target_unit: SopTargetUnit,
    pub last_updated: NaiveDate,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

// ───────────────────────────────────────
// Identities, roles, sessions
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "operator" | "user" => Ok(Role::Operator),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: Uuid,
    pub email: String,
}

/// A signed-in identity with the role resolved once at sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
}

// ───────────────────────────────────────
// DTOs helpful for endpoints
// ───────────────────────────────────────
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub identity: Identity,
    pub is_admin: bool,
}

impl From<&Session> for SessionInfo {
    fn from(s: &Session) -> Self {
        SessionInfo {
            identity: s.identity.clone(),
            is_admin: s.role.is_admin(),
        }
    }
}
