// === Module Header START ===
// purpose: Reconstruct where every item stood at the end of each done week (cumulative flow)
// role: core/cfd
// inputs: Items (board-ordered column histories), the FlowPolicy, the Calendar and the AnalysisWindow
// outputs: CumulativeFlow with one count per column per probed week, plus the done-band floor
// invariants:
// - an item sits in the first board column whose intervals contain the probe, else in the backlog column
// - items created on or after probe + 1 day are not counted at that probe
// - probes are the distinct week-ending dates of done weeks inside the window, ascending
// - the column set is fixed up front: board columns in order, then the backlog column if not on the board
// tie_breakers: snapshots fan out over rayon and are collected in probe order
// === Module Header END ===

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rayon::prelude::*;

use crate::calendar::{week_end, week_key, AnalysisWindow, Calendar};
use crate::config::FlowPolicy;
use crate::model::{CfdWeek, ColumnCount, CumulativeFlow};
use crate::timeline::Item;

pub fn cfd_columns(items: &[Item], policy: &FlowPolicy) -> Vec<String> {
  let mut columns: Vec<String> =
    items.first().map(|i| i.columns.iter().map(|c| c.name.clone()).collect()).unwrap_or_default();
  if !columns.contains(&policy.backlog_column) {
    columns.push(policy.backlog_column.clone());
  }
  columns
}

pub fn column_at<'a>(item: &'a Item, t: DateTime<Utc>, backlog: &'a str) -> &'a str {
  item.columns.iter().find(|c| c.contains(t)).map_or(backlog, |c| c.name.as_str())
}

pub fn snapshot(items: &[Item], probe: DateTime<Utc>, columns: &[String], backlog: &str) -> Vec<ColumnCount> {
  let cutoff = probe + Duration::days(1);
  let mut counts = vec![0usize; columns.len()];
  for item in items.iter().filter(|i| i.created_at < cutoff) {
    let name = column_at(item, probe, backlog);
    if let Some(idx) = columns.iter().position(|c| c == name) {
      counts[idx] += 1;
    }
  }

  columns.iter().zip(counts).map(|(column, count)| ColumnCount { column: column.clone(), count }).collect()
}

pub fn probe_dates(items: &[Item], policy: &FlowPolicy, cal: &Calendar, window: &AnalysisWindow) -> Vec<NaiveDate> {
  let dates: BTreeSet<NaiveDate> = items
    .iter()
    .filter(|i| i.entered(&policy.commitment_start_columns).is_some())
    .filter(|i| i.entered(&policy.in_progress_start_columns).is_some())
    .filter_map(|i| i.entered(&policy.done_columns))
    .filter(|done| window.contains(cal, *done))
    .map(|done| week_end(cal.local_date(done)))
    .collect();
  dates.into_iter().collect()
}

fn done_band(week: &CfdWeek, policy: &FlowPolicy) -> usize {
  week.counts.iter().filter(|c| policy.done_columns.contains(&c.column)).map(|c| c.count).sum()
}

pub fn cumulative_flow(items: &[Item], policy: &FlowPolicy, cal: &Calendar, window: &AnalysisWindow) -> CumulativeFlow {
  let columns = cfd_columns(items, policy);
  let probes = probe_dates(items, policy, cal, window);

  let weeks: Vec<CfdWeek> = probes
    .par_iter()
    .map(|date| CfdWeek {
      week: week_key(*date),
      week_ending: *date,
      counts: snapshot(items, cal.start_of_day(*date), &columns, &policy.backlog_column),
    })
    .collect();

  let done_floor = weeks.iter().map(|w| done_band(w, policy)).min().unwrap_or(0);
  CumulativeFlow { columns, weeks, done_floor }
}
