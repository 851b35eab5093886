//! Property-based checks for interval membership, column pairing, touch time, histograms and percentiles.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use kanban_flow_metrics::aggregate::{lead_time_histogram, percentile, throughput_histogram};
use kanban_flow_metrics::calendar::WeekKey;
use kanban_flow_metrics::interval::Interval;
use kanban_flow_metrics::metrics::{touch_time_days, ItemMetrics};
use kanban_flow_metrics::model::ThroughputWeek;
use kanban_flow_metrics::timeline::build_columns;
use kanban_flow_metrics::{FlowPolicy, RawTransition, StatusMap};

const STATUSES: [&str; 5] = ["1", "2", "3", "4", "99"];

fn base() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap()
}

fn board() -> StatusMap {
  let mut map = StatusMap::new();
  map.add_column("To Do", ["1", "2"]).unwrap();
  map.add_column("In Progress", ["3"]).unwrap();
  map.add_column("Done", ["4"]).unwrap();
  map
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_transition() -> impl Strategy<Value = RawTransition> {
  (0..10_000i64, proptest::option::of(0..STATUSES.len()), proptest::option::of(0..STATUSES.len())).prop_map(
    |(minutes, from, to)| {
      RawTransition::new(base() + Duration::minutes(minutes), from.map(|i| STATUSES[i]), to.map(|i| STATUSES[i]))
    },
  )
}

fn arb_done_item() -> impl Strategy<Value = (i64, bool)> {
  (-20..60i64, any::<bool>())
}

fn metrics(lead: i64, defect: bool) -> ItemMetrics {
  let at = base() + Duration::days(30);
  ItemMetrics {
    key: "P-1".into(),
    issue_type: if defect { "Defect".into() } else { "Story".into() },
    lead_time_days: lead,
    touch_time_days: 0,
    queue_time_days: 0,
    commitment_at: at,
    started_at: at,
    done_at: at,
    columns: Vec::new(),
  }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
  #[test]
  fn interval_is_closed_at_entry_and_open_at_exit(start in 0..100_000i64, len in 1..100_000i64) {
    let entered = base() + Duration::seconds(start);
    let exited = entered + Duration::seconds(len);
    let interval = Interval::new(entered, Some(exited));
    prop_assert!(interval.contains(entered));
    prop_assert!(!interval.contains(exited));
    prop_assert!(Interval::new(entered, None).contains(exited));
  }

  #[test]
  fn every_mapped_entry_gets_one_interval(transitions in proptest::collection::vec(arb_transition(), 0..40)) {
    let map = board();
    let columns = build_columns(&transitions, &map);
    prop_assert_eq!(columns.len(), 3);

    let column_of = |s: &Option<String>| s.as_deref().and_then(|s| map.column_for(s)).map(str::to_string);
    for column in &columns {
      let moves: Vec<&RawTransition> =
        transitions.iter().filter(|t| column_of(&t.from_status) != column_of(&t.to_status)).collect();
      let entries = moves.iter().filter(|t| column_of(&t.to_status).as_deref() == Some(column.name.as_str())).count();
      prop_assert_eq!(column.intervals.len(), entries);

      let exits: Vec<DateTime<Utc>> = moves
        .iter()
        .filter(|t| column_of(&t.from_status).as_deref() == Some(column.name.as_str()))
        .map(|t| t.timestamp)
        .collect();
      for interval in &column.intervals {
        let expected = exits.iter().copied().filter(|x| *x >= interval.entered).min();
        prop_assert_eq!(interval.exited, expected);
      }
      prop_assert!(column.intervals.windows(2).all(|w| w[0].entered <= w[1].entered));
    }
  }

  #[test]
  fn touch_plus_queue_share_is_lead(lead in -1_000..1_000i64, queue in 0..1_000i64) {
    let touch = touch_time_days(lead, queue);
    prop_assert!(touch >= 0);
    prop_assert_eq!(touch + lead.min(queue), lead);
  }

  #[test]
  fn lead_time_buckets_account_for_every_item(items in proptest::collection::vec(arb_done_item(), 0..50)) {
    let done: Vec<ItemMetrics> = items.iter().map(|(lead, defect)| metrics(*lead, *defect)).collect();
    let buckets = lead_time_histogram(&done, &FlowPolicy::default());
    let total: usize = buckets.iter().map(|b| b.value + b.defects).sum();
    prop_assert_eq!(total, done.len());
    let defects: usize = buckets.iter().map(|b| b.defects).sum();
    prop_assert_eq!(defects, items.iter().filter(|(_, d)| *d).count());
    prop_assert_eq!(buckets.first().map(|b| b.start), Some(0));
  }

  #[test]
  fn throughput_buckets_account_for_every_week(counts in proptest::collection::vec(0..30usize, 0..30)) {
    let weeks: Vec<ThroughputWeek> = counts
      .iter()
      .enumerate()
      .map(|(i, n)| ThroughputWeek {
        week: WeekKey { year: 2024, week: i as u32 + 1 },
        throughput: *n,
        value: *n,
        defects: 0,
        failure_demand_pct: 0.0,
      })
      .collect();
    let buckets = throughput_histogram(&weeks);
    prop_assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), weeks.len());
    let max = counts.iter().copied().max().unwrap_or(0) as i64;
    prop_assert_eq!(buckets.last().map(|b| b.end), Some(max));
  }

  #[test]
  fn percentile_picks_a_member_and_grows_with_rank(values in proptest::collection::vec(-50..500i64, 0..60)) {
    let p90 = percentile(&values, 90);
    let p95 = percentile(&values, 95);
    prop_assert!(p90 == 0 || values.contains(&p90));
    prop_assert!(p95 == 0 || values.contains(&p95));
    if values.len() * 90 / 100 > 0 {
      prop_assert!(p90 <= p95);
    }
  }

  #[test]
  fn percentile_never_drops_when_the_set_grows_past_it(
    base in proptest::collection::vec(-50..500i64, 1..40),
    offsets in proptest::collection::vec(0..200i64, 0..40),
    rank in prop_oneof![Just(50u32), Just(90u32), Just(95u32)],
  ) {
    prop_assume!(base.len() * rank as usize / 100 > 0);
    let before = percentile(&base, rank);

    // the superset keeps every original value and only adds ones at or above the percentile
    let mut grown = base.clone();
    grown.extend(offsets.iter().map(|o| before + o));
    let after = percentile(&grown, rank);

    prop_assert!(after >= before);
    prop_assert!(grown.contains(&after));
  }
}
