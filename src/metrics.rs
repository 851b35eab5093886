// === Module Header START ===
// purpose: Per-item flow metrics (lead, queue and touch time in whole days)
// role: core/metrics
// inputs: one Item plus the FlowPolicy
// outputs: ItemMetrics for items that reached commitment, in-progress and done columns
// invariants:
// - lead time runs from the most recent commitment entry to the first arrival in done
// - when that arrival precedes the commitment entry, the most recent done entry is used instead
// - queue time takes each queue column's latest stay (last exit - last entry), summed in fractional days and rounded once
// - touch = lead - min(lead, queue) and is 0 whenever lead is 0
// - missing endpoints yield 0, never an error
// tie_breakers: rounding is half-to-even on whole days
// === Module Header END ===

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FlowPolicy;
use crate::interval::MILLIS_PER_DAY;
use crate::timeline::{ColumnState, Item};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetrics {
  pub key: String,
  #[serde(rename = "type")]
  pub issue_type: String,
  pub lead_time_days: i64,
  pub touch_time_days: i64,
  pub queue_time_days: i64,
  pub commitment_at: DateTime<Utc>,
  pub started_at: DateTime<Utc>,
  pub done_at: DateTime<Utc>,
  pub columns: Vec<ColumnState>,
}

impl ItemMetrics {
  /// Metrics for an item that went through commitment, in-progress and done; `None` otherwise.
  pub fn for_done_item(item: &Item, policy: &FlowPolicy) -> Option<Self> {
    let commitment_at = item.entered(&policy.commitment_start_columns)?;
    let started_at = item.entered(&policy.in_progress_start_columns)?;
    let done_at = item.first_entered(&policy.done_columns)?;

    let lead = lead_time_days(item, policy);
    let queue = queue_time_days(item, policy);

    Some(Self {
      key: item.key.clone(),
      issue_type: item.issue_type.clone(),
      lead_time_days: lead,
      touch_time_days: touch_time_days(lead, queue),
      queue_time_days: queue,
      commitment_at,
      started_at,
      done_at,
      columns: item.columns.clone(),
    })
  }
}

pub fn lead_time_days(item: &Item, policy: &FlowPolicy) -> i64 {
  let (Some(start), Some(first_done)) =
    (item.entered(&policy.commitment_start_columns), item.first_entered(&policy.done_columns))
  else {
    return 0;
  };

  // reopened items: first arrival in done can predate the latest commitment
  let end = if first_done < start { item.entered(&policy.done_columns) } else { Some(first_done) };

  match end {
    Some(end) => round_days(end - start),
    None => 0,
  }
}

pub fn queue_time_days(item: &Item, policy: &FlowPolicy) -> i64 {
  let days: f64 = item.columns.iter().filter(|c| policy.is_queue(&c.name)).filter_map(latest_stay_days).sum();
  days.round_ties_even() as i64
}

/// Latest stay in a column: last exit minus last entry, when the item has left since.
fn latest_stay_days(column: &ColumnState) -> Option<f64> {
  let (entered, exited) = (column.last_entered?, column.last_exited?);
  if exited < entered {
    return None;
  }
  Some((exited - entered).num_milliseconds() as f64 / MILLIS_PER_DAY)
}

pub fn touch_time_days(lead_time_days: i64, queue_time_days: i64) -> i64 {
  if lead_time_days == 0 {
    return 0;
  }
  lead_time_days - lead_time_days.min(queue_time_days)
}

fn round_days(d: Duration) -> i64 {
  (d.num_milliseconds() as f64 / MILLIS_PER_DAY).round_ties_even() as i64
}
