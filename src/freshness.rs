//! Stale-data detection
//!
//! A panel is stale when its newest reading is at least `stale_after` older
//! than the caller-supplied `now`. This is independent of the look-back
//! window, which is anchored on the newest reading rather than the clock.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Stale,
    NoData,
}

impl Freshness {
    pub fn assess(
        latest: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        stale_after: TimeDelta,
    ) -> Self {
        match latest {
            None => Self::NoData,
            Some(ts) if now.signed_duration_since(ts) >= stale_after => Self::Stale,
            Some(_) => Self::Fresh,
        }
    }

    pub const fn is_stale(self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

/// `stale_after` from whole minutes.
pub fn minutes(minutes: u32) -> TimeDelta {
    TimeDelta::minutes(i64::from(minutes))
}
