// === Module Header START ===
// purpose: Define the JSON report model (window, done items, and one explicit struct per series kind)
// role: model/types
// outputs: Serializable structs with stable field names consumed by rendering and tests
// invariants: field order is the JSON order; week labels serialize as "YYYY-WW"; dates as YYYY-MM-DD
// === Module Header END ===

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::calendar::{AnalysisWindow, WeekKey};
use crate::metrics::ItemMetrics;

#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
  pub window: AnalysisWindow,
  pub done_items: Vec<ItemMetrics>,
  pub flow_efficiency: FlowEfficiency,
  pub lead_time_histogram: Vec<LeadTimeBucket>,
  pub weekly_throughput: WeeklyThroughput,
  pub throughput_histogram: Vec<ThroughputBucket>,
  pub control_chart: ControlChart,
  pub cumulative_flow: CumulativeFlow,
  pub summary: Summary,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
  pub items: usize,
  pub done_items: usize,
  pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEfficiencyWeek {
  pub week: WeekKey,
  pub items: usize,
  pub average_lead_time: i64,
  pub flow_efficiency_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEfficiency {
  pub weeks: Vec<FlowEfficiencyWeek>,
  pub average: f64,
}

/// Lead-time range `[start, end]` in days, split into value and failure demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadTimeBucket {
  pub label: String,
  pub start: i64,
  pub end: i64,
  pub value: usize,
  pub defects: usize,
}

/// Number of weeks whose throughput fell in `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThroughputBucket {
  pub label: String,
  pub start: i64,
  pub end: i64,
  pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputWeek {
  pub week: WeekKey,
  pub throughput: usize,
  pub value: usize,
  pub defects: usize,
  pub failure_demand_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyThroughput {
  pub weeks: Vec<ThroughputWeek>,
  pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlPoint {
  pub key: String,
  pub issue_type: String,
  pub done: DateTime<Utc>,
  /// Days since the first done date on the chart.
  pub day_index: i64,
  pub lead_time: i64,
  pub defect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlChart {
  pub days: Vec<NaiveDate>,
  pub points: Vec<ControlPoint>,
  pub average: f64,
  pub p90: i64,
  pub p95: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnCount {
  pub column: String,
  pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CfdWeek {
  pub week: WeekKey,
  pub week_ending: NaiveDate,
  /// One entry per column of the enclosing `CumulativeFlow`, same order.
  pub counts: Vec<ColumnCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CumulativeFlow {
  pub columns: Vec<String>,
  pub weeks: Vec<CfdWeek>,
  /// Smallest done-band count across the series; subtract it to floor-shift the band.
  pub done_floor: usize,
}
