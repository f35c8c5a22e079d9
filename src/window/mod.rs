//! Rolling Window Reducer
//!
//! Restricts a time-ordered sample set to the trailing `hours` that end at the
//! **last sample's** timestamp (not wall-clock time, since the feed itself may
//! be stale) and computes statistics for that view.
//!
//! The reducer is pure and recomputes from the full input every time; it is
//! re-run whenever the look-back selection or the input changes.

mod stats;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;
use tracing::warn;

use crate::types::Sample;

pub use stats::{channel_names, FieldStats, WindowStatistics};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Look-back choices offered by the dashboard selector
pub const STANDARD_LOOK_BACK_HOURS: [f64; 3] = [6.0, 12.0, 24.0];

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum WindowError {
    #[error("look-back must be a positive, finite number of hours (got {0})")]
    InvalidHours(f64),
}

// ============================================================================
// Look-back
// ============================================================================

/// A validated look-back span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct LookBack {
    hours: f64,
}

impl LookBack {
    pub fn hours(hours: f64) -> Result<Self, WindowError> {
        if hours.is_finite() && hours > 0.0 {
            Ok(Self { hours })
        } else {
            Err(WindowError::InvalidHours(hours))
        }
    }

    pub const fn as_hours(self) -> f64 {
        self.hours
    }

    /// Earliest timestamp kept when the newest sample is at `last`.
    ///
    /// Saturates at the minimum representable instant for absurdly long spans.
    pub fn cutoff(self, last: DateTime<Utc>) -> DateTime<Utc> {
        let millis = (self.hours * MS_PER_HOUR).round() as i64;
        TimeDelta::try_milliseconds(millis)
            .and_then(|span| last.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl TryFrom<f64> for LookBack {
    type Error = WindowError;

    fn try_from(hours: f64) -> Result<Self, Self::Error> {
        Self::hours(hours)
    }
}

impl From<LookBack> for f64 {
    fn from(look_back: LookBack) -> Self {
        look_back.hours
    }
}

// ============================================================================
// Reduction
// ============================================================================

/// The window view of a sample set plus its statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowReport<'a> {
    pub look_back: LookBack,
    /// `None` when the input was empty
    pub cutoff: Option<DateTime<Utc>>,
    /// Samples at or after the cutoff, in input order
    pub samples: Cow<'a, [Sample]>,
    pub statistics: WindowStatistics,
}

impl WindowReport<'_> {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample in the window.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }
}

/// Filter `samples` to the look-back window and compute statistics.
///
/// Secondary statistics cover every channel seen anywhere in the *full* input,
/// so a channel that goes quiet inside the window still reports `Unavailable`.
pub fn reduce(samples: &[Sample], look_back: LookBack) -> WindowReport<'_> {
    let channels = channel_names(samples);

    let Some(last) = samples.last() else {
        return WindowReport {
            look_back,
            cutoff: None,
            samples: Cow::Borrowed(samples),
            statistics: WindowStatistics::unavailable(&channels),
        };
    };

    let cutoff = look_back.cutoff(last.timestamp);
    let kept = filter_since(samples, cutoff);
    let statistics = WindowStatistics::compute(&kept, &channels);

    WindowReport {
        look_back,
        cutoff: Some(cutoff),
        samples: kept,
        statistics,
    }
}

/// Keep samples with `timestamp >= cutoff`, preserving order.
///
/// Time-ordered input borrows the matching suffix; out-of-order input falls
/// back to a copying filter.
pub fn filter_since(samples: &[Sample], cutoff: DateTime<Utc>) -> Cow<'_, [Sample]> {
    if is_time_ordered(samples) {
        let start = samples.partition_point(|s| s.timestamp < cutoff);
        return Cow::Borrowed(&samples[start..]);
    }

    warn!(
        samples = samples.len(),
        "Samples are not in time order, window is not a contiguous suffix"
    );
    Cow::Owned(
        samples
            .iter()
            .filter(|s| s.timestamp >= cutoff)
            .cloned()
            .collect(),
    )
}

/// Whether timestamps never decrease.
pub fn is_time_ordered(samples: &[Sample]) -> bool {
    samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}
