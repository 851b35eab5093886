// === Module Header START ===
// purpose: Turn one item's raw status transitions into per-column entry/exit histories
// role: core/timeline
// inputs: RawTransition events (any order) and a StatusMap (status id -> board column)
// outputs: ColumnState per board column (board order) and the immutable Item built from them
// invariants:
// - transitions whose mapped from/to columns are equal are ignored (sub-status moves)
// - every entry yields exactly one Interval, closed by the earliest exit >= the entry (open if none)
// - intervals are ordered by entered ascending; last_entered/last_exited are the maxima of the raw lists
// - a column the item never visited has no intervals and no timestamps
// tie_breakers: events with equal timestamps keep their input order (stable sort)
// === Module Header END ===

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::interval::Interval;

/// A single status change as recorded by the ticketing system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransition {
  pub timestamp: DateTime<Utc>,
  pub from_status: Option<String>,
  pub to_status: Option<String>,
}

impl RawTransition {
  pub fn new(timestamp: DateTime<Utc>, from_status: Option<&str>, to_status: Option<&str>) -> Self {
    Self {
      timestamp,
      from_status: from_status.map(str::to_string),
      to_status: to_status.map(str::to_string),
    }
  }
}

/// Board columns in display order, plus the status ids that belong to each.
#[derive(Debug, Clone, Default)]
pub struct StatusMap {
  columns: Vec<String>,
  by_status: HashMap<String, usize>,
}

impl StatusMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a column and its statuses. Re-registering a name extends that column.
  pub fn add_column<I, S>(&mut self, name: &str, status_ids: I) -> Result<(), BoardError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let idx = match self.columns.iter().position(|c| c == name) {
      Some(idx) => idx,
      None => {
        self.columns.push(name.to_string());
        self.columns.len() - 1
      }
    };

    for status in status_ids {
      let status = status.into();
      if let Some(&other) = self.by_status.get(&status) {
        if other != idx {
          return Err(BoardError::DuplicateStatus {
            status,
            first: self.columns[other].clone(),
            second: name.to_string(),
          });
        }
        continue;
      }
      self.by_status.insert(status, idx);
    }

    Ok(())
  }

  pub fn columns(&self) -> &[String] {
    &self.columns
  }

  pub fn column_for(&self, status: &str) -> Option<&str> {
    self.index_of(Some(status)).map(|idx| self.columns[idx].as_str())
  }

  fn index_of(&self, status: Option<&str>) -> Option<usize> {
    status.and_then(|s| self.by_status.get(s).copied())
  }
}

/// History of one item inside one board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnState {
  pub name: String,
  pub last_entered: Option<DateTime<Utc>>,
  pub last_exited: Option<DateTime<Utc>>,
  pub intervals: Vec<Interval>,
}

impl ColumnState {
  pub fn contains(&self, t: DateTime<Utc>) -> bool {
    self.intervals.iter().any(|i| i.contains(t))
  }
}

/// Build the per-column history for one item, one ColumnState per board column.
pub fn build_columns(transitions: &[RawTransition], map: &StatusMap) -> Vec<ColumnState> {
  let mut moves: Vec<(DateTime<Utc>, Option<usize>, Option<usize>)> = transitions
    .iter()
    .map(|t| (t.timestamp, map.index_of(t.from_status.as_deref()), map.index_of(t.to_status.as_deref())))
    .filter(|(_, from, to)| from != to)
    .collect();
  moves.sort_by_key(|(ts, _, _)| *ts);

  map
    .columns()
    .iter()
    .enumerate()
    .map(|(idx, name)| {
      let entered: Vec<DateTime<Utc>> = moves.iter().filter(|m| m.2 == Some(idx)).map(|m| m.0).collect();
      let exited: Vec<DateTime<Utc>> = moves.iter().filter(|m| m.1 == Some(idx)).map(|m| m.0).collect();

      let intervals = entered
        .iter()
        .map(|&e| Interval::new(e, exited.iter().copied().find(|&x| x >= e)))
        .collect();

      ColumnState {
        name: name.clone(),
        last_entered: entered.last().copied(),
        last_exited: exited.last().copied(),
        intervals,
      }
    })
    .collect()
}

/// A work item with its reconstructed column history. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
  pub key: String,
  #[serde(rename = "type")]
  pub issue_type: String,
  pub created_at: DateTime<Utc>,
  pub columns: Vec<ColumnState>,
}

impl Item {
  pub fn new(key: &str, issue_type: &str, created_at: DateTime<Utc>, columns: Vec<ColumnState>) -> Self {
    Self { key: key.to_string(), issue_type: issue_type.to_string(), created_at, columns }
  }

  /// Build an item straight from its raw transitions.
  pub fn from_transitions(
    key: &str,
    issue_type: &str,
    created_at: DateTime<Utc>,
    transitions: &[RawTransition],
    map: &StatusMap,
  ) -> Self {
    Self::new(key, issue_type, created_at, build_columns(transitions, map))
  }

  pub fn column(&self, name: &str) -> Option<&ColumnState> {
    self.columns.iter().find(|c| c.name == name)
  }

  /// Most recent entry into the first of `names` (priority order) the item ever entered.
  pub fn entered<S: AsRef<str>>(&self, names: &[S]) -> Option<DateTime<Utc>> {
    self.first_by_priority(names, |c| c.last_entered)
  }

  /// Most recent exit from the first of `names` (priority order) the item ever left.
  pub fn exited<S: AsRef<str>>(&self, names: &[S]) -> Option<DateTime<Utc>> {
    self.first_by_priority(names, |c| c.last_exited)
  }

  /// First entry of the histories of `names`, concatenated in priority order.
  pub fn first_entered<S: AsRef<str>>(&self, names: &[S]) -> Option<DateTime<Utc>> {
    self.first_by_priority(names, |c| c.intervals.first().map(|i| i.entered))
  }

  fn first_by_priority<S, T, F>(&self, names: &[S], pick: F) -> Option<T>
  where
    S: AsRef<str>,
    F: Fn(&ColumnState) -> Option<T>,
  {
    names.iter().filter_map(|n| self.column(n.as_ref())).find_map(pick)
  }
}
