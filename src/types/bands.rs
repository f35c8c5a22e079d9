//! Magnitude band tables
//!
//! A band table is an ordered partition of a magnitude domain into labelled
//! ranges. Upper bounds are inclusive (`magnitude <= upper`), so a value sitting
//! exactly on a boundary belongs to the lower band. The last band is always
//! unbounded above.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

// ============================================================================
// Built-in Tables
// ============================================================================

/// Wind speed bands (m/s)
const WIND_SPEED_BANDS: &[(f64, &str)] = &[
    (2.0, "0-2 m/s"),
    (4.0, "2-4 m/s"),
    (6.0, "4-6 m/s"),
    (8.0, "6-8 m/s"),
    (10.0, "8-10 m/s"),
    (12.0, "10-12 m/s"),
    (14.0, "12-14 m/s"),
];
const WIND_SPEED_TOP: &str = ">14 m/s";

/// Significant wave height bands (m)
const WAVE_HEIGHT_BANDS: &[(f64, &str)] = &[
    (0.5, "0-0.5 m"),
    (1.0, "0.5-1 m"),
    (1.5, "1-1.5 m"),
    (2.0, "1.5-2 m"),
    (2.5, "2-2.5 m"),
    (3.0, "2.5-3 m"),
    (4.0, "3-4 m"),
];
const WAVE_HEIGHT_TOP: &str = ">4 m";

/// Mean wave period bands (s)
const WAVE_PERIOD_BANDS: &[(f64, &str)] = &[
    (3.0, "0-3 s"),
    (5.0, "3-5 s"),
    (7.0, "5-7 s"),
    (9.0, "7-9 s"),
    (11.0, "9-11 s"),
    (13.0, "11-13 s"),
    (15.0, "13-15 s"),
];
const WAVE_PERIOD_TOP: &str = ">15 s";

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BandError {
    #[error("band table is empty")]
    Empty,

    #[error("band {0} has an empty label")]
    EmptyLabel(usize),

    #[error("duplicate band label '{0}'")]
    DuplicateLabel(String),

    #[error("band '{label}' has a non-finite upper bound ({upper})")]
    NonFiniteBound { label: String, upper: f64 },

    #[error("band bounds must be strictly ascending: '{label}' ({upper}) follows {previous}")]
    NotAscending {
        label: String,
        upper: f64,
        previous: f64,
    },

    #[error("only the last band may be unbounded, found unbounded band '{0}'")]
    UnboundedNotLast(String),

    #[error("band table has no unbounded top band")]
    MissingTopBand,
}

// ============================================================================
// Band Types
// ============================================================================

/// One labelled magnitude range. `upper == None` marks the unbounded top band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    pub label: String,
}

impl MagnitudeBand {
    pub fn bounded(upper: f64, label: impl Into<String>) -> Self {
        Self {
            upper: Some(upper),
            label: label.into(),
        }
    }

    pub fn unbounded(label: impl Into<String>) -> Self {
        Self {
            upper: None,
            label: label.into(),
        }
    }

    /// Whether `magnitude` falls at or below this band's upper bound.
    pub fn admits(&self, magnitude: f64) -> bool {
        self.upper.map_or(true, |upper| magnitude <= upper)
    }
}

/// A validated, ordered band table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BandTable {
    bands: Vec<MagnitudeBand>,
}

impl BandTable {
    /// Build a table from ascending `(upper, label)` pairs plus the label of
    /// the unbounded top band.
    pub fn new<I, S>(bounded: I, top_label: impl Into<String>) -> Result<Self, BandError>
    where
        I: IntoIterator<Item = (f64, S)>,
        S: Into<String>,
    {
        let mut bands: Vec<MagnitudeBand> = bounded
            .into_iter()
            .map(|(upper, label)| MagnitudeBand::bounded(upper, label))
            .collect();
        bands.push(MagnitudeBand::unbounded(top_label));
        Self::from_bands(bands)
    }

    /// Build a table from `(upper, label)` pairs where the last pair carries
    /// `f64::INFINITY` as its bound.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, BandError>
    where
        I: IntoIterator<Item = (f64, S)>,
        S: Into<String>,
    {
        let bands = pairs
            .into_iter()
            .map(|(upper, label)| {
                if upper == f64::INFINITY {
                    MagnitudeBand::unbounded(label)
                } else {
                    MagnitudeBand::bounded(upper, label)
                }
            })
            .collect();
        Self::from_bands(bands)
    }

    /// Validate an explicit band list (as read from configuration).
    pub fn from_bands(bands: Vec<MagnitudeBand>) -> Result<Self, BandError> {
        validate_bands(&bands)?;
        Ok(Self { bands })
    }

    pub fn wind_speed() -> Self {
        Self::builtin(WIND_SPEED_BANDS, WIND_SPEED_TOP)
    }

    pub fn wave_height() -> Self {
        Self::builtin(WAVE_HEIGHT_BANDS, WAVE_HEIGHT_TOP)
    }

    pub fn wave_period() -> Self {
        Self::builtin(WAVE_PERIOD_BANDS, WAVE_PERIOD_TOP)
    }

    fn builtin(bounded: &[(f64, &str)], top: &str) -> Self {
        let mut bands: Vec<MagnitudeBand> = bounded
            .iter()
            .map(|&(upper, label)| MagnitudeBand::bounded(upper, label))
            .collect();
        bands.push(MagnitudeBand::unbounded(top));
        Self { bands }
    }

    /// Index of the band `magnitude` belongs to.
    ///
    /// Scans in ascending order and takes the first band whose upper bound is
    /// `>= magnitude`. Anything unmatched (including NaN) lands in the last band.
    pub fn band_index(&self, magnitude: f64) -> usize {
        self.bands
            .iter()
            .position(|band| band.admits(magnitude))
            .unwrap_or_else(|| self.bands.len().saturating_sub(1))
    }

    pub fn bands(&self) -> &[MagnitudeBand] {
        &self.bands
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl<'de> Deserialize<'de> for BandTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bands = Vec::<MagnitudeBand>::deserialize(deserializer)?;
        Self::from_bands(bands).map_err(serde::de::Error::custom)
    }
}

fn validate_bands(bands: &[MagnitudeBand]) -> Result<(), BandError> {
    let Some((top, bounded)) = bands.split_last() else {
        return Err(BandError::Empty);
    };

    let mut seen = HashSet::new();
    for (i, band) in bands.iter().enumerate() {
        if band.label.trim().is_empty() {
            return Err(BandError::EmptyLabel(i));
        }
        if !seen.insert(band.label.as_str()) {
            return Err(BandError::DuplicateLabel(band.label.clone()));
        }
    }

    let mut previous: Option<f64> = None;
    for band in bounded {
        let Some(upper) = band.upper else {
            return Err(BandError::UnboundedNotLast(band.label.clone()));
        };
        if !upper.is_finite() {
            return Err(BandError::NonFiniteBound {
                label: band.label.clone(),
                upper,
            });
        }
        if let Some(prev) = previous {
            if upper <= prev {
                return Err(BandError::NotAscending {
                    label: band.label.clone(),
                    upper,
                    previous: prev,
                });
            }
        }
        previous = Some(upper);
    }

    if top.upper.is_some() {
        return Err(BandError::MissingTopBand);
    }
    Ok(())
}
