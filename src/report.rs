// === Module Header START ===
// purpose: Assemble the full flow report (window, done items, every series) from items and a policy
// role: orchestration/report
// inputs: validated FlowPolicy, Items from the board reader, the effective `now`
// outputs: FlowReport ready to serialize
// invariants:
// - the window is derived from `now` in the policy timezone
// - done_items hold only items whose first done entry falls in the window, ordered by (done_at, key)
// - the result does not depend on rayon scheduling
// errors: PolicyError when the timezone cannot be resolved
// === Module Header END ===

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::aggregate;
use crate::calendar::{AnalysisWindow, Calendar};
use crate::cfd;
use crate::config::FlowPolicy;
use crate::error::PolicyError;
use crate::metrics::ItemMetrics;
use crate::model::{FlowReport, Summary};
use crate::timeline::Item;

pub fn done_in_window(items: &[Item], policy: &FlowPolicy, cal: &Calendar, window: &AnalysisWindow) -> Vec<ItemMetrics> {
  let mut done: Vec<ItemMetrics> = items
    .par_iter()
    .filter_map(|item| ItemMetrics::for_done_item(item, policy))
    .filter(|m| window.contains(cal, m.done_at))
    .collect();
  done.sort_by(|a, b| a.done_at.cmp(&b.done_at).then_with(|| a.key.cmp(&b.key)));
  done
}

pub fn build_report(policy: &FlowPolicy, items: &[Item], now: DateTime<Utc>) -> Result<FlowReport, PolicyError> {
  let cal = Calendar::new(policy.tz()?);
  let window = AnalysisWindow::ending_at(cal.local_date(now), policy.months_to_analyse);
  tracing::info!(start = %window.start, end = %window.end, timezone = %policy.timezone, "analysis window");

  let done_items = done_in_window(items, policy, &cal, &window);
  tracing::info!(items = items.len(), done = done_items.len(), "computed item metrics");

  let weekly_throughput = aggregate::weekly_throughput(&done_items, &window.weeks(), &cal, policy);
  let throughput_histogram = aggregate::throughput_histogram(&weekly_throughput.weeks);
  let flow_efficiency = aggregate::flow_efficiency(&done_items, &cal);
  let lead_time_histogram = aggregate::lead_time_histogram(&done_items, policy);
  let control_chart = aggregate::control_chart(&done_items, &cal, policy);
  let cumulative_flow = cfd::cumulative_flow(items, policy, &cal, &window);
  tracing::debug!(
    weeks = weekly_throughput.weeks.len(),
    probes = cumulative_flow.weeks.len(),
    "aggregated series"
  );

  Ok(FlowReport {
    window,
    summary: Summary { items: items.len(), done_items: done_items.len(), generated_at: now },
    done_items,
    flow_efficiency,
    lead_time_histogram,
    weekly_throughput,
    throughput_histogram,
    control_chart,
    cumulative_flow,
  })
}
