use chrono::{Duration, TimeZone, Utc};
use kanban_flow_metrics::aggregate::lead_time_histogram;
use kanban_flow_metrics::metrics::ItemMetrics;
use kanban_flow_metrics::FlowPolicy;

fn done(key: &str, issue_type: &str, lead: i64) -> ItemMetrics {
  let done_at = Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).single().unwrap();
  ItemMetrics {
    key: key.into(),
    issue_type: issue_type.into(),
    lead_time_days: lead,
    touch_time_days: lead,
    queue_time_days: 0,
    commitment_at: done_at - Duration::days(lead),
    started_at: done_at - Duration::days(lead),
    done_at,
    columns: Vec::new(),
  }
}

#[test]
fn lead_time_histogram_snapshot() {
  test_support::init_insta();
  let items = vec![done("S-1", "Story", 1), done("B-1", "Defect", 2), done("S-2", "Story", 4), done("B-2", "Defect", 7)];
  let buckets = lead_time_histogram(&items, &FlowPolicy::default());

  insta::assert_json_snapshot!(buckets, @r###"
  [
    {
      "label": "0-2",
      "start": 0,
      "end": 2,
      "value": 1,
      "defects": 1
    },
    {
      "label": "3-5",
      "start": 3,
      "end": 5,
      "value": 1,
      "defects": 0
    },
    {
      "label": "6-7",
      "start": 6,
      "end": 7,
      "value": 0,
      "defects": 1
    }
  ]
  "###);
}
