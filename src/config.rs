// === Module Header START ===
// purpose: Flow policy (which columns mean commitment, in progress, done, queue) loaded from JSON
// role: config/policy
// inputs: optional JSON policy file; CLI overrides applied by the caller
// outputs: validated FlowPolicy consumed read-only by metrics, aggregation and snapshots
// invariants:
// - every field is optional in the file and falls back to the documented default
// - validate() fails fast on empty/blank column lists, zero months and unknown timezones
// - column names are matched exactly; issue types and keys case-insensitively
// errors: IO/JSON errors carry the file path; policy errors are PolicyError
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowPolicy {
  /// Issue types counted as failure demand.
  pub defect_issue_types: Vec<String>,
  pub ignored_issue_types: Vec<String>,
  pub ignored_issue_keys: Vec<String>,
  pub queue_columns: Vec<String>,
  pub commitment_start_columns: Vec<String>,
  pub in_progress_start_columns: Vec<String>,
  pub done_columns: Vec<String>,
  /// Where an item sits when no column history covers a probed instant.
  pub backlog_column: String,
  pub months_to_analyse: u32,
  /// IANA zone used to turn instants into calendar dates.
  pub timezone: String,
}

impl Default for FlowPolicy {
  fn default() -> Self {
    Self {
      defect_issue_types: vec!["Defect".into()],
      ignored_issue_types: Vec::new(),
      ignored_issue_keys: Vec::new(),
      queue_columns: vec!["To Do".into()],
      commitment_start_columns: vec!["To Do".into()],
      in_progress_start_columns: vec!["In Progress".into()],
      done_columns: vec!["Done".into()],
      backlog_column: "Backlog".into(),
      months_to_analyse: 5,
      timezone: "UTC".into(),
    }
  }
}

impl FlowPolicy {
  /// Read a policy file. Missing fields take their defaults; the result is not yet validated.
  pub fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading policy {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing policy {}", path.display()))
  }

  pub fn validate(&self) -> Result<(), PolicyError> {
    let required = [
      ("commitment_start_columns", &self.commitment_start_columns),
      ("in_progress_start_columns", &self.in_progress_start_columns),
      ("done_columns", &self.done_columns),
    ];
    for (field, list) in required {
      if list.is_empty() {
        return Err(PolicyError::EmptyColumnList { field });
      }
    }

    let named = [
      ("queue_columns", &self.queue_columns),
      ("commitment_start_columns", &self.commitment_start_columns),
      ("in_progress_start_columns", &self.in_progress_start_columns),
      ("done_columns", &self.done_columns),
    ];
    for (field, list) in named {
      if list.iter().any(|name| name.trim().is_empty()) {
        return Err(PolicyError::BlankColumnName { field });
      }
    }

    if self.backlog_column.trim().is_empty() {
      return Err(PolicyError::BlankBacklogColumn);
    }
    if self.months_to_analyse == 0 {
      return Err(PolicyError::ZeroMonths);
    }
    self.tz()?;

    Ok(())
  }

  pub fn tz(&self) -> Result<Tz, PolicyError> {
    self
      .timezone
      .parse::<Tz>()
      .map_err(|_| PolicyError::UnknownTimezone(self.timezone.clone()))
  }

  pub fn is_defect(&self, issue_type: &str) -> bool {
    contains_ignore_case(&self.defect_issue_types, issue_type)
  }

  pub fn is_ignored(&self, key: &str, issue_type: &str) -> bool {
    contains_ignore_case(&self.ignored_issue_keys, key) || contains_ignore_case(&self.ignored_issue_types, issue_type)
  }

  pub fn is_queue(&self, column: &str) -> bool {
    self.queue_columns.iter().any(|c| c == column)
  }
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
  let value = value.to_lowercase();
  list.iter().any(|candidate| candidate.to_lowercase() == value)
}
