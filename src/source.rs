// === Module Header START ===
// purpose: Read a board export (columns + issues with status changelogs) into Items
// role: io/source
// inputs: board export JSON (file or Value) and the FlowPolicy for ignore filters
// outputs: BoardExport { status map, items sorted by key, ignored count }
// invariants:
// - status ids are opaque strings whether the export writes them as strings or numbers
// - only changelog entries with field == "status" become transitions
// - ignored keys/types (case-insensitive) are dropped before their timestamps are parsed
// errors: structural problems are BoardError naming the column index or issue key; IO/JSON carry the path
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::FlowPolicy;
use crate::error::BoardError;
use crate::ext::serde_json::JsonFetch;
use crate::timeline::{Item, RawTransition, StatusMap};

#[derive(Debug, Clone)]
pub struct BoardExport {
  pub status_map: StatusMap,
  pub items: Vec<Item>,
  pub ignored: usize,
}

pub fn read_board(path: &Path, policy: &FlowPolicy) -> Result<BoardExport> {
  let raw = std::fs::read_to_string(path).with_context(|| format!("reading board export {}", path.display()))?;
  let doc: Value =
    serde_json::from_str(&raw).with_context(|| format!("parsing board export {}", path.display()))?;
  parse_board(&doc, policy).with_context(|| format!("invalid board export {}", path.display()))
}

pub fn parse_board(doc: &Value, policy: &FlowPolicy) -> Result<BoardExport, BoardError> {
  let status_map = status_map(doc)?;

  let issues = doc.get("issues").and_then(Value::as_array).ok_or(BoardError::MissingIssues)?;
  let mut items = Vec::with_capacity(issues.len());
  let mut ignored = 0usize;

  for (index, issue) in issues.iter().enumerate() {
    let key = issue.fetch("key").to::<String>().filter(|k| !k.trim().is_empty()).ok_or(BoardError::MissingKey { index })?;
    let issue_type = issue
      .fetch("fields.issuetype.name")
      .to::<String>()
      .ok_or_else(|| BoardError::MissingField { key: key.clone(), field: "fields.issuetype.name" })?;

    if policy.is_ignored(&key, &issue_type) {
      tracing::debug!(%key, %issue_type, "ignoring issue");
      ignored += 1;
      continue;
    }

    let created = timestamp_at(issue, "fields.created", &key)?;
    let transitions = transitions(issue, &key)?;
    items.push(Item::from_transitions(&key, &issue_type, created, &transitions, &status_map));
  }

  items.sort_by(|a, b| a.key.cmp(&b.key));
  tracing::info!(columns = status_map.columns().len(), items = items.len(), ignored, "read board export");

  Ok(BoardExport { status_map, items, ignored })
}

fn status_map(doc: &Value) -> Result<StatusMap, BoardError> {
  let columns = doc.get("columns").and_then(Value::as_array).ok_or(BoardError::MissingColumns)?;
  let mut map = StatusMap::new();

  for (index, column) in columns.iter().enumerate() {
    let name = column
      .fetch("name")
      .to::<String>()
      .filter(|n| !n.trim().is_empty())
      .ok_or(BoardError::UnnamedColumn { index })?;
    let ids: Vec<String> = column.fetch("statusIds").elements().iter().filter_map(|v| v.fetch("").to_id()).collect();
    map.add_column(&name, ids)?;
  }

  Ok(map)
}

fn transitions(issue: &Value, key: &str) -> Result<Vec<RawTransition>, BoardError> {
  let mut out = Vec::new();
  for history in issue.fetch("changelog.histories").elements() {
    let changes = history.fetch("items").elements();
    if !changes.iter().any(is_status_change) {
      continue;
    }

    let at = timestamp_at(history, "created", key)?;
    for change in changes.iter().filter(|c| is_status_change(c)) {
      out.push(RawTransition {
        timestamp: at,
        from_status: change.fetch("from").to_id(),
        to_status: change.fetch("to").to_id(),
      });
    }
  }
  Ok(out)
}

fn is_status_change(change: &Value) -> bool {
  change.fetch("field").to::<String>().as_deref() == Some("status")
}

fn timestamp_at(v: &Value, path: &'static str, key: &str) -> Result<DateTime<Utc>, BoardError> {
  let raw = v.fetch(path).to::<String>().ok_or_else(|| BoardError::MissingField { key: key.to_string(), field: path })?;
  parse_timestamp(&raw).ok_or_else(|| BoardError::BadTimestamp { key: key.to_string(), raw })
}

/// RFC 3339 or the ticketing system's `2024-01-02T09:00:00.000+0000` form, normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw)
    .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}
