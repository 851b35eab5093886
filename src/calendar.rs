// === Module Header START ===
// purpose: Sunday-anchored week numbering, analysis window bounds and timezone-aware day boundaries
// role: core/calendar
// inputs: UTC instants, calendar dates, an IANA timezone, an optional `now` override
// outputs: WeekKey buckets, week start/end dates, AnalysisWindow, local-midnight instants
// invariants:
// - weeks start on Sunday; week 1 is the week containing January 1st (first-day rule, not ISO-8601)
// - week_start/week_end never leave the year of the probed date
// - no ambient locale lookup; the timezone is an explicit parameter
// === Module Header END ===

use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// `(year, week-of-year)` bucket, rendered as `YYYY-WW`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct WeekKey {
  pub year: i32,
  pub week: u32,
}

impl fmt::Display for WeekKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.week)
  }
}

impl From<WeekKey> for String {
  fn from(key: WeekKey) -> Self {
    key.to_string()
  }
}

pub fn days_from_sunday(date: NaiveDate) -> u32 {
  date.weekday().num_days_from_sunday()
}

fn first_of_year(date: NaiveDate) -> NaiveDate {
  date - Duration::days(date.ordinal0() as i64)
}

pub fn week_of_year(date: NaiveDate) -> u32 {
  (date.ordinal0() + days_from_sunday(first_of_year(date))) / 7 + 1
}

pub fn week_key(date: NaiveDate) -> WeekKey {
  WeekKey { year: date.year(), week: week_of_year(date) }
}

/// Sunday opening the week of `date`, or January 1st for the year's first partial week.
pub fn week_start(date: NaiveDate) -> NaiveDate {
  let sunday = date - Duration::days(days_from_sunday(date) as i64);
  if sunday.year() < date.year() {
    first_of_year(date)
  } else {
    sunday
  }
}

/// Saturday closing the week of `date`, or December 31st for the year's last partial week.
pub fn week_end(date: NaiveDate) -> NaiveDate {
  let saturday = date + Duration::days(6 - days_from_sunday(date) as i64);
  if saturday.year() > date.year() {
    saturday - Duration::days(saturday.ordinal() as i64)
  } else {
    saturday
  }
}

/// Turns instants into local calendar dates for one fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct Calendar {
  tz: Tz,
}

impl Calendar {
  pub fn new(tz: Tz) -> Self {
    Self { tz }
  }

  pub fn utc() -> Self {
    Self { tz: Tz::UTC }
  }

  pub fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&self.tz).date_naive()
  }

  pub fn week_of(&self, ts: DateTime<Utc>) -> WeekKey {
    week_key(self.local_date(ts))
  }

  /// Local midnight of `date` as a UTC instant.
  ///
  /// When midnight falls in a DST gap the day starts at the first local hour that exists.
  pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..24)
      .find_map(|h| self.tz.from_local_datetime(&(midnight + Duration::hours(h))).earliest())
      .unwrap_or_else(|| self.tz.from_utc_datetime(&midnight))
      .with_timezone(&Utc)
  }
}

/// Dates `[start, end]` whose completions are analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisWindow {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl AnalysisWindow {
  /// `months` back from `today` through the Sunday opening the current week.
  pub fn ending_at(today: NaiveDate, months: u32) -> Self {
    let start = today.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN);
    let end = today - Duration::days(days_from_sunday(today) as i64);
    Self { start, end }
  }

  pub fn contains(&self, cal: &Calendar, ts: DateTime<Utc>) -> bool {
    ts >= cal.start_of_day(self.start) && ts <= cal.start_of_day(self.end)
  }

  /// Every week touched by `[start, end)`, chronological.
  pub fn weeks(&self) -> Vec<WeekKey> {
    let mut out: Vec<WeekKey> = Vec::new();
    for date in self.start.iter_days().take_while(|d| *d < self.end) {
      let key = week_key(date);
      if out.last() != Some(&key) {
        out.push(key);
      }
    }
    out
  }
}

/// Parse a `--now-override` string into a UTC instant.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive `%Y-%m-%dT%H:%M:%S` read as UTC.
pub fn parse_now_override(raw: &str) -> Result<DateTime<Utc>> {
  chrono::DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|ndt| ndt.and_utc()))
    .with_context(|| format!("invalid --now-override `{raw}`"))
}
