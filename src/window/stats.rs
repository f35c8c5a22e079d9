//! Min/max/average statistics with an explicit "unavailable" state

use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, BTreeSet};

use crate::types::Sample;

/// Statistics for one field over a set of samples.
///
/// `Unavailable` is returned when no sample carries a finite value, so an
/// empty window can never leak `Infinity`/`NaN` into a display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldStats {
    Available {
        min: f64,
        max: f64,
        avg: f64,
        count: usize,
    },
    Unavailable,
}

impl FieldStats {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let present: Vec<f64> = values
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .collect();
        if present.is_empty() {
            return Self::Unavailable;
        }
        Self::Available {
            min: Statistics::min(present.iter()),
            max: Statistics::max(present.iter()),
            avg: Statistics::mean(present.iter()),
            count: present.len(),
        }
    }

    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    pub const fn min(&self) -> Option<f64> {
        match *self {
            Self::Available { min, .. } => Some(min),
            Self::Unavailable => None,
        }
    }

    pub const fn max(&self) -> Option<f64> {
        match *self {
            Self::Available { max, .. } => Some(max),
            Self::Unavailable => None,
        }
    }

    pub const fn avg(&self) -> Option<f64> {
        match *self {
            Self::Available { avg, .. } => Some(avg),
            Self::Unavailable => None,
        }
    }

    pub const fn count(&self) -> usize {
        match *self {
            Self::Available { count, .. } => count,
            Self::Unavailable => 0,
        }
    }

    /// `"min / avg / max"` with `decimals` places, or `"-"` when unavailable.
    pub fn display(&self, decimals: usize) -> String {
        match *self {
            Self::Available { min, max, avg, .. } => {
                format!("{min:.decimals$} / {avg:.decimals$} / {max:.decimals$}")
            }
            Self::Unavailable => "-".to_string(),
        }
    }
}

/// Statistics for the magnitude and every secondary channel of a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStatistics {
    pub magnitude: FieldStats,
    pub secondary: BTreeMap<String, FieldStats>,
}

impl WindowStatistics {
    /// Compute stats over `samples` for the magnitude and each name in `channels`.
    pub fn compute(samples: &[Sample], channels: &BTreeSet<String>) -> Self {
        let magnitude = FieldStats::from_values(samples.iter().map(Sample::magnitude));
        let secondary = channels
            .iter()
            .map(|name| {
                let stats = FieldStats::from_values(samples.iter().map(|s| s.secondary(name)));
                (name.clone(), stats)
            })
            .collect();
        Self { magnitude, secondary }
    }

    /// All fields unavailable.
    pub fn unavailable(channels: &BTreeSet<String>) -> Self {
        Self {
            magnitude: FieldStats::Unavailable,
            secondary: channels
                .iter()
                .map(|name| (name.clone(), FieldStats::Unavailable))
                .collect(),
        }
    }

    pub fn channel(&self, name: &str) -> Option<&FieldStats> {
        self.secondary.get(name)
    }
}

/// Every secondary channel name carried by any sample.
pub fn channel_names(samples: &[Sample]) -> BTreeSet<String> {
    samples
        .iter()
        .flat_map(|s| s.secondary.keys().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_skip_missing_values() {
        let values = [Some(2.0), None, Some(4.0), Some(f64::NAN), Some(9.0)];
        let stats = FieldStats::from_values(values);
        assert_eq!(stats.min(), Some(2.0));
        assert_eq!(stats.max(), Some(9.0));
        assert_eq!(stats.count(), 3);
        let avg = stats.avg().expect("available");
        assert!((avg - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_is_unavailable_not_infinite() {
        let stats = FieldStats::from_values(std::iter::empty());
        assert_eq!(stats, FieldStats::Unavailable);
        assert_eq!(stats.min(), None);
        assert_eq!(stats.display(1), "-");

        let all_missing = FieldStats::from_values([None, None]);
        assert!(!all_missing.is_available());
    }

    #[test]
    fn test_display_formats_triple() {
        let stats = FieldStats::from_values([Some(1.0), Some(2.0)]);
        assert_eq!(stats.display(1), "1.0 / 1.5 / 2.0");
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let json = serde_json::to_value(FieldStats::Unavailable).expect("serialize");
        assert_eq!(json["status"], "unavailable");
        let json = serde_json::to_value(FieldStats::from_values([Some(3.0)])).expect("serialize");
        assert_eq!(json["status"], "available");
        assert_eq!(json["max"], 3.0);
    }

    #[test]
    fn test_window_statistics_per_channel() {
        let ts = chrono::DateTime::from_timestamp_millis(0).expect("epoch");
        let samples = vec![
            Sample::new(ts, Some(1.0), None)
                .with_secondary("period", Some(7.0))
                .with_secondary("max_height", None),
            Sample::new(ts, Some(2.0), None).with_secondary("period", Some(9.0)),
        ];
        let names = channel_names(&samples);
        let stats = WindowStatistics::compute(&samples, &names);
        assert_eq!(stats.channel("period").and_then(FieldStats::max), Some(9.0));
        assert_eq!(stats.channel("max_height"), Some(&FieldStats::Unavailable));
        assert_eq!(stats.magnitude.min(), Some(1.0));
    }
}
