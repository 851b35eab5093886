// === Module Header START ===
// purpose: Roll per-item metrics up into weekly throughput, flow efficiency, histograms and a control chart
// role: core/aggregate
// inputs: done ItemMetrics (ordered by done_at, key), the Calendar, the FlowPolicy, the window's weeks
// outputs: model series structs ready for serialization
// invariants:
// - every window week appears in weekly throughput, zero weeks included
// - weeks whose lead-time sum is 0 are absent from flow efficiency
// - histogram buckets cover [0, max] in fixed widths and their counts sum to the input count
// - percentages and averages round half-to-even to 1 decimal; division by zero yields 0
// tie_breakers: weeks ascend by (year, week); negative lead times land in the first bucket
// === Module Header END ===

use std::collections::BTreeMap;

use crate::calendar::{Calendar, WeekKey};
use crate::config::FlowPolicy;
use crate::metrics::ItemMetrics;
use crate::model::{
  ControlChart, ControlPoint, FlowEfficiency, FlowEfficiencyWeek, LeadTimeBucket, ThroughputBucket, ThroughputWeek,
  WeeklyThroughput,
};

pub const LEAD_TIME_BUCKET_DAYS: i64 = 3;
pub const THROUGHPUT_BUCKET_WIDTH: i64 = 4;

pub fn round1(x: f64) -> f64 {
  (x * 10.0).round_ties_even() / 10.0
}

pub fn mean(values: &[i64]) -> f64 {
  if values.is_empty() {
    return 0.0;
  }
  values.iter().sum::<i64>() as f64 / values.len() as f64
}

/// Nearest-rank percentile: `sorted[floor(N*P/100) - 1]`, 0 when that index is negative.
pub fn percentile(values: &[i64], p: u32) -> i64 {
  let mut sorted = values.to_vec();
  sorted.sort_unstable();
  let qty = sorted.len() * p as usize / 100;
  if qty == 0 {
    0
  } else {
    sorted[qty - 1]
  }
}

/// `(start, end)` ranges of `width` covering `[0, max]`; the last one may be narrower.
pub fn bucket_ranges(max: i64, width: i64) -> Vec<(i64, i64)> {
  let width = width.max(1);
  (0..=max.max(0)).step_by(width as usize).map(|start| (start, (start + width - 1).min(max))).collect()
}

fn bucket_index(value: i64, width: i64) -> usize {
  (value.max(0) / width.max(1)) as usize
}

fn bucket_label(start: i64, end: i64) -> String {
  format!("{start}-{end}")
}

pub fn weekly_throughput(
  done: &[ItemMetrics],
  window_weeks: &[WeekKey],
  cal: &Calendar,
  policy: &FlowPolicy,
) -> WeeklyThroughput {
  let mut by_week: BTreeMap<WeekKey, (usize, usize)> = window_weeks.iter().map(|w| (*w, (0, 0))).collect();
  for m in done {
    let slot = by_week.entry(cal.week_of(m.done_at)).or_default();
    if policy.is_defect(&m.issue_type) {
      slot.1 += 1;
    } else {
      slot.0 += 1;
    }
  }

  let weeks: Vec<ThroughputWeek> = by_week
    .into_iter()
    .map(|(week, (value, defects))| {
      let throughput = value + defects;
      let failure_demand_pct =
        if throughput == 0 { 0.0 } else { round1(defects as f64 / throughput as f64 * 100.0) };
      ThroughputWeek { week, throughput, value, defects, failure_demand_pct }
    })
    .collect();

  let counts: Vec<i64> = weeks.iter().map(|w| w.throughput as i64).collect();
  WeeklyThroughput { average: round1(mean(&counts)), weeks }
}

pub fn flow_efficiency(done: &[ItemMetrics], cal: &Calendar) -> FlowEfficiency {
  let mut by_week: BTreeMap<WeekKey, Vec<&ItemMetrics>> = BTreeMap::new();
  for m in done {
    by_week.entry(cal.week_of(m.done_at)).or_default().push(m);
  }

  let weeks: Vec<FlowEfficiencyWeek> = by_week
    .into_iter()
    .filter_map(|(week, items)| {
      let lead: i64 = items.iter().map(|m| m.lead_time_days).sum();
      if lead == 0 {
        return None;
      }
      let touch: i64 = items.iter().map(|m| m.touch_time_days).sum();
      Some(FlowEfficiencyWeek {
        week,
        items: items.len(),
        average_lead_time: (lead as f64 / items.len() as f64).round_ties_even() as i64,
        flow_efficiency_pct: round1(touch as f64 / lead as f64 * 100.0),
      })
    })
    .collect();

  let average = if weeks.is_empty() {
    0.0
  } else {
    round1(weeks.iter().map(|w| w.flow_efficiency_pct).sum::<f64>() / weeks.len() as f64)
  };
  FlowEfficiency { weeks, average }
}

pub fn lead_time_histogram(done: &[ItemMetrics], policy: &FlowPolicy) -> Vec<LeadTimeBucket> {
  let width = LEAD_TIME_BUCKET_DAYS;
  let max = done.iter().map(|m| m.lead_time_days).max().unwrap_or(0).max(0);
  let mut buckets: Vec<LeadTimeBucket> = bucket_ranges(max, width)
    .into_iter()
    .map(|(start, end)| LeadTimeBucket { label: bucket_label(start, end), start, end, value: 0, defects: 0 })
    .collect();

  for m in done {
    let bucket = &mut buckets[bucket_index(m.lead_time_days, width)];
    if policy.is_defect(&m.issue_type) {
      bucket.defects += 1;
    } else {
      bucket.value += 1;
    }
  }
  buckets
}

pub fn throughput_histogram(weeks: &[ThroughputWeek]) -> Vec<ThroughputBucket> {
  let width = THROUGHPUT_BUCKET_WIDTH;
  let max = weeks.iter().map(|w| w.throughput as i64).max().unwrap_or(0);
  let mut buckets: Vec<ThroughputBucket> = bucket_ranges(max, width)
    .into_iter()
    .map(|(start, end)| ThroughputBucket { label: bucket_label(start, end), start, end, count: 0 })
    .collect();

  for w in weeks {
    buckets[bucket_index(w.throughput as i64, width)].count += 1;
  }
  buckets
}

pub fn control_chart(done: &[ItemMetrics], cal: &Calendar, policy: &FlowPolicy) -> ControlChart {
  let mut ordered: Vec<&ItemMetrics> = done.iter().collect();
  ordered.sort_by(|a, b| a.done_at.cmp(&b.done_at).then_with(|| a.key.cmp(&b.key)));

  let first = ordered.first().map(|m| cal.local_date(m.done_at));
  let last = ordered.last().map(|m| cal.local_date(m.done_at));
  let days = match (first, last) {
    (Some(first), Some(last)) => first.iter_days().take_while(|d| *d <= last).collect(),
    _ => Vec::new(),
  };

  let points: Vec<ControlPoint> = ordered
    .iter()
    .map(|m| ControlPoint {
      key: m.key.clone(),
      issue_type: m.issue_type.clone(),
      done: m.done_at,
      day_index: first.map_or(0, |f| (cal.local_date(m.done_at) - f).num_days()),
      lead_time: m.lead_time_days,
      defect: policy.is_defect(&m.issue_type),
    })
    .collect();

  let leads: Vec<i64> = points.iter().map(|p| p.lead_time).collect();
  ControlChart {
    days,
    average: round1(mean(&leads)),
    p90: percentile(&leads, 90),
    p95: percentile(&leads, 95),
    points,
  }
}
