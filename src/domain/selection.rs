use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::record::RowRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectableConfig {
    /// Record column whose value decides whether a row is locked.
    pub data_column: String,
    #[serde(default)]
    pub approve_cases: Vec<Value>,
    #[serde(default)]
    pub decline_cases: Vec<Value>,
    /// Width of the indicator column, as a percentage like column widths.
    pub width: f64,
}

impl SelectableConfig {
    pub fn lock_for(&self, record: &RowRecord) -> RowLock {
        let value = record.get(&self.data_column).unwrap_or(&Value::Null);
        if self.approve_cases.contains(value) {
            RowLock::Approved
        } else if self.decline_cases.contains(value) {
            RowLock::Declined
        } else {
            RowLock::Open
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLock {
    Open,
    Approved,
    Declined,
}

impl RowLock {
    pub fn is_locked(self) -> bool {
        !matches!(self, RowLock::Open)
    }
}

/// Indices of selected rows in the currently loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowSelection {
    rows: BTreeSet<usize>,
}

impl RowSelection {
    /// Flips membership of `row_idx`. Locked rows never change; returns
    /// whether the selection changed.
    pub fn toggle(&mut self, row_idx: usize, lock: RowLock) -> bool {
        if lock.is_locked() {
            return false;
        }
        if !self.rows.remove(&row_idx) {
            self.rows.insert(row_idx);
        }
        true
    }

    pub fn contains(&self, row_idx: usize) -> bool {
        self.rows.contains(&row_idx)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What the select cell of a row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectIndicator {
    pub check_mark: bool,
    pub cross_mark: bool,
    pub disabled: bool,
}

impl SelectIndicator {
    pub fn new(selected: bool, lock: RowLock) -> Self {
        Self {
            check_mark: selected || lock == RowLock::Approved,
            cross_mark: lock == RowLock::Declined,
            disabled: lock.is_locked(),
        }
    }
}
