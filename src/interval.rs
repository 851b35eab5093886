// === Module Header START ===
// purpose: Half-open [entered, exited) interval an item spent inside one board column
// role: model/primitive
// outputs: Interval value type with membership testing
// invariants:
// - entered <= exited whenever exited is known
// - exited == None means the item never left (open towards +infinity)
// - contains() is inclusive at entered and exclusive at exited
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
  pub entered: DateTime<Utc>,
  /// `None` when the item has not left the column (yet).
  pub exited: Option<DateTime<Utc>>,
}

impl Interval {
  pub fn new(entered: DateTime<Utc>, exited: Option<DateTime<Utc>>) -> Self {
    Self { entered, exited }
  }

  /// Membership test: `entered <= t < exited`.
  pub fn contains(&self, t: DateTime<Utc>) -> bool {
    self.entered <= t && self.exited.map_or(true, |exited| t < exited)
  }
}

pub(crate) const MILLIS_PER_DAY: f64 = 86_400_000.0;
