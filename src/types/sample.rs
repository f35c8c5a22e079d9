//! Buoy sample types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One buoy observation after ingest and unit conversion.
///
/// Missing readings are `None`. Non-finite numbers are treated as missing by
/// every accessor, so aggregation code never has to check for NaN itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    /// Wind speed (m/s), wave height (m) or wave period (s)
    pub magnitude: Option<f64>,
    /// Direction in degrees, 0 = north, clockwise
    pub direction: Option<f64>,
    /// Extra scalar channels carried alongside (gust, max_height, period, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secondary: BTreeMap<String, Option<f64>>,
    /// Extra bearing channels (degrees). Reported as latest values only,
    /// never averaged.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bearings: BTreeMap<String, Option<f64>>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, magnitude: Option<f64>, direction: Option<f64>) -> Self {
        Self {
            timestamp,
            magnitude,
            direction,
            secondary: BTreeMap::new(),
            bearings: BTreeMap::new(),
        }
    }

    /// Build a sample from an epoch-millisecond timestamp.
    ///
    /// Returns `None` when the timestamp is outside chrono's representable range.
    pub fn from_millis(
        millis: i64,
        magnitude: Option<f64>,
        direction: Option<f64>,
    ) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|ts| Self::new(ts, magnitude, direction))
    }

    /// Attach a secondary channel value.
    #[must_use]
    pub fn with_secondary(mut self, name: impl Into<String>, value: Option<f64>) -> Self {
        self.secondary.insert(name.into(), value);
        self
    }

    /// Attach a bearing channel value.
    #[must_use]
    pub fn with_bearing(mut self, name: impl Into<String>, value: Option<f64>) -> Self {
        self.bearings.insert(name.into(), value);
        self
    }

    pub fn magnitude(&self) -> Option<f64> {
        finite(self.magnitude)
    }

    pub fn direction(&self) -> Option<f64> {
        finite(self.direction)
    }

    pub fn secondary(&self, name: &str) -> Option<f64> {
        self.secondary.get(name).copied().and_then(finite)
    }

    pub fn bearing(&self, name: &str) -> Option<f64> {
        self.bearings.get(name).copied().and_then(finite)
    }

    /// Read whichever channel `measure` selects.
    pub fn measure(&self, measure: &Measure) -> Option<f64> {
        match measure {
            Measure::Magnitude => self.magnitude(),
            Measure::Secondary(name) => self.secondary(name),
        }
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Which channel of a [`Sample`] a rose or statistic reads as its magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    #[default]
    Magnitude,
    Secondary(String),
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Magnitude => write!(f, "magnitude"),
            Self::Secondary(name) => write!(f, "{name}"),
        }
    }
}

pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
