// src/core/entry.rs
//
// Rules for a shift report being filled in: which checklist items apply,
// the online/offline toggle, the kW→MW load heuristic, and final assembly.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::models::{
    Checklist, ChecklistItem, OfflineReason, Shift, ShiftLog, UnitEntry, UnitGroup, UnitId,
    UnitState,
};

/// Loads above this are assumed to be typed in kW and get divided by 1000.
pub const AUTO_SCALE_THRESHOLD: f64 = 500.0;

#[derive(Error, Debug, PartialEq)]
pub enum EntryError {
    #[error("group name is required")]
    EmptyGroupName,

    #[error("{group} reports must cover exactly {expected}")]
    UnitMismatch { group: &'static str, expected: String },

    #[error("offline reason can only be chosen while {0} is offline")]
    ReasonWhileOnline(UnitId),
}

// ───────────────────────────────────────
// Checklist relevance
// ───────────────────────────────────────

/// Checklist items that apply to a report for `(shift, group)`, in display order.
/// The same list drives what the form shows and what gets persisted.
pub fn applicable_items(shift: Shift, group: UnitGroup) -> Vec<ChecklistItem> {
    let mut items = Vec::with_capacity(8);
    if shift.is_morning() {
        items.extend([
            ChecklistItem::PemanasanEdg,
            ChecklistItem::Housekeeping,
            ChecklistItem::PemanasanFirefighting,
        ]);
        items.push(match group {
            UnitGroup::Unit12 => ChecklistItem::DrainKompresor,
            UnitGroup::Unit34 => ChecklistItem::DrainSeparator,
        });
    }
    match group {
        UnitGroup::Unit12 => items.extend([
            ChecklistItem::PurifierOliUnit1,
            ChecklistItem::EngkolManualTurbinUnit1,
            ChecklistItem::PurifierOliUnit2,
            ChecklistItem::EngkolManualTurbinUnit2,
        ]),
        UnitGroup::Unit34 => items.extend([
            ChecklistItem::PenambahanNaohUnit3,
            ChecklistItem::PenambahanNaohUnit4,
        ]),
    }
    items
}

/// Keeps only the applicable items; every applicable item is present, unticked
/// ones as `false`. Inapplicable items are dropped, not set to `false`.
pub fn relevant_checklist(shift: Shift, group: UnitGroup, toggles: &Checklist) -> Checklist {
    applicable_items(shift, group)
        .into_iter()
        .map(|item| (item, toggles.get(&item).copied().unwrap_or(false)))
        .collect()
}

// ───────────────────────────────────────
// Load inputs
// ───────────────────────────────────────

pub fn auto_scale_load(value: f64) -> f64 {
    if value > AUTO_SCALE_THRESHOLD {
        value / 1000.0
    } else {
        value
    }
}

/// A load field as typed: empty, or a non-negative number.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawLoad")]
pub enum LoadInput {
    #[default]
    Empty,
    Value(f64),
}

impl LoadInput {
    /// Applies the auto-scale once, as when the field loses focus.
    pub fn on_blur(self) -> Self {
        match self {
            LoadInput::Value(v) => LoadInput::Value(auto_scale_load(v)),
            LoadInput::Empty => LoadInput::Empty,
        }
    }

    pub fn or_zero(self) -> f64 {
        match self {
            LoadInput::Value(v) => v,
            LoadInput::Empty => 0.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLoad {
    Number(f64),
    Text(String),
    Null(()),
}

impl TryFrom<RawLoad> for LoadInput {
    type Error = String;

    fn try_from(raw: RawLoad) -> Result<Self, Self::Error> {
        let value = match raw {
            RawLoad::Null(()) => return Ok(LoadInput::Empty),
            RawLoad::Number(v) => v,
            RawLoad::Text(s) if s.trim().is_empty() => return Ok(LoadInput::Empty),
            RawLoad::Text(s) => s
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .map_err(|_| format!("load '{s}' is not a number"))?,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(format!("load must be a non-negative number, got {value}"));
        }
        Ok(LoadInput::Value(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadField {
    LoadCurrent,
    LoadLowest,
    LoadHighest,
}

// ───────────────────────────────────────
// Drafts
// ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "UnitDraftWire")]
pub struct UnitDraft {
    pub unit_id: UnitId,
    pub state: UnitState,
    pub load_current: LoadInput,
    pub load_lowest: LoadInput,
    pub load_highest: LoadInput,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitDraftWire {
    unit_id: UnitId,
    #[serde(default = "online_by_default")]
    is_online: bool,
    #[serde(default)]
    offline_reason: Option<OfflineReason>,
    #[serde(default)]
    load_current: LoadInput,
    #[serde(default)]
    load_lowest: LoadInput,
    #[serde(default)]
    load_highest: LoadInput,
}

fn online_by_default() -> bool {
    true
}

impl From<UnitDraftWire> for UnitDraft {
    fn from(w: UnitDraftWire) -> Self {
        UnitDraft {
            unit_id: w.unit_id,
            state: UnitState::from_wire(w.is_online, w.offline_reason),
            load_current: w.load_current,
            load_lowest: w.load_lowest,
            load_highest: w.load_highest,
        }
    }
}

impl UnitDraft {
    /// Fresh form row: online with empty loads.
    pub fn new(unit_id: UnitId) -> Self {
        UnitDraft {
            unit_id,
            state: UnitState::Online,
            load_current: LoadInput::Empty,
            load_lowest: LoadInput::Empty,
            load_highest: LoadInput::Empty,
        }
    }

    /// Going offline always starts at Standby; going online forgets the reason.
    pub fn set_online(&mut self, online: bool) {
        self.state = if online {
            UnitState::Online
        } else {
            UnitState::Offline(OfflineReason::Standby)
        };
    }

    pub fn set_offline_reason(&mut self, reason: OfflineReason) -> Result<(), EntryError> {
        match self.state {
            UnitState::Online => Err(EntryError::ReasonWhileOnline(self.unit_id)),
            UnitState::Offline(_) => {
                self.state = UnitState::Offline(reason);
                Ok(())
            }
        }
    }

    pub fn set_load(&mut self, field: LoadField, value: LoadInput) {
        *self.field_mut(field) = value;
    }

    pub fn blur(&mut self, field: LoadField) {
        let slot = self.field_mut(field);
        *slot = slot.on_blur();
    }

    fn field_mut(&mut self, field: LoadField) -> &mut LoadInput {
        match field {
            LoadField::LoadCurrent => &mut self.load_current,
            LoadField::LoadLowest => &mut self.load_lowest,
            LoadField::LoadHighest => &mut self.load_highest,
        }
    }

    fn into_entry(self, notes: &str) -> UnitEntry {
        UnitEntry {
            unit_id: self.unit_id,
            state: self.state,
            load_current: self.load_current.or_zero(),
            load_lowest: self.load_lowest.or_zero(),
            load_highest: self.load_highest.or_zero(),
            notes: notes.to_string(),
        }
    }
}

/// A shift report as submitted by the entry form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDraft {
    pub group_name: String,
    pub shift: Shift,
    pub unit_group: UnitGroup,
    pub units: Vec<UnitDraft>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub checklist: Checklist,
}

impl ShiftDraft {
    pub fn new(shift: Shift, unit_group: UnitGroup) -> Self {
        ShiftDraft {
            group_name: String::new(),
            shift,
            unit_group,
            units: unit_group.units().into_iter().map(UnitDraft::new).collect(),
            notes: String::new(),
            checklist: Checklist::new(),
        }
    }

    /// Switching group starts the unit rows, notes and checklist over.
    pub fn select_unit_group(&mut self, unit_group: UnitGroup) {
        *self = ShiftDraft {
            group_name: std::mem::take(&mut self.group_name),
            ..ShiftDraft::new(self.shift, unit_group)
        };
    }

    pub fn toggle_checklist(&mut self, item: ChecklistItem) {
        let ticked = self.checklist.entry(item).or_insert(false);
        *ticked = !*ticked;
    }

    pub fn unit_mut(&mut self, unit_id: UnitId) -> Option<&mut UnitDraft> {
        self.units.iter_mut().find(|u| u.unit_id == unit_id)
    }

    /// Builds the immutable log. Entries come out in the group's unit order,
    /// empty loads become 0, and both entries carry the shared notes.
    pub fn assemble(self, id: String, now: DateTime<Utc>) -> Result<ShiftLog, EntryError> {
        if self.group_name.trim().is_empty() {
            return Err(EntryError::EmptyGroupName);
        }

        let expected = self.unit_group.units();
        let mut units = self.units;
        let mismatch = || EntryError::UnitMismatch {
            group: self.unit_group.as_str(),
            expected: format!("{} and {}", expected[0], expected[1]),
        };
        if units.len() != expected.len() {
            return Err(mismatch());
        }
        units.sort_by_key(|u| u.unit_id);
        if units.iter().map(|u| u.unit_id).ne(expected) {
            return Err(mismatch());
        }

        let entries = units
            .into_iter()
            .map(|u| u.into_entry(&self.notes))
            .collect();

        Ok(ShiftLog {
            id,
            date: now,
            shift: self.shift,
            group_name: self.group_name,
            unit_group: self.unit_group,
            entries,
            checklist: relevant_checklist(self.shift, self.unit_group, &self.checklist),
            created_by: None,
            user_email: None,
        })
    }
}
