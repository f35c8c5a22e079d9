//! Circular Binner - direction/magnitude histograms for rose charts
//!
//! Groups `(direction, magnitude)` samples into 16 compass sectors of 22.5°,
//! then sub-bins each sector by magnitude band. Every count is normalized
//! against the number of *valid* samples (both channels present), so sector
//! percentages add up to 100 and band percentages add up to their sector.
//!
//! ## Sector Layout
//!
//! Sector `i` covers `[i·22.5 − 11.25, i·22.5 + 11.25)` degrees, which puts
//! sector 0 squarely on north:
//!
//! ```text
//! index = floor(((direction + 11.25) mod 360) / 22.5)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let rose = rose::bin(&window.samples, &BandTable::wind_speed());
//! match rose {
//!     Some(hist) => render(hist),
//!     None => show_no_data(),
//! }
//! ```

pub mod scale;

use serde::Serialize;
use tracing::debug;

use crate::types::{BandTable, Measure, Sample};

pub use scale::{RoseScale, RoseWedge, WedgeSegment};

/// Number of angular sectors in a rose
pub const SECTOR_COUNT: usize = 16;

/// Angular width of one sector (degrees)
pub const SECTOR_WIDTH_DEG: f64 = 360.0 / SECTOR_COUNT as f64;

const HALF_SECTOR_DEG: f64 = SECTOR_WIDTH_DEG / 2.0;

/// Compass point names, indexed by sector
pub const COMPASS_POINTS: [&str; SECTOR_COUNT] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

// ============================================================================
// Histogram Types
// ============================================================================

/// Share of all valid samples that fall in one sector *and* one band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandShare {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

/// One of the 16 compass sectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoseSector {
    pub index: usize,
    pub compass: &'static str,
    pub count: usize,
    /// Share of all valid samples in this sector (0-100)
    pub percentage: f64,
    /// Per-band shares, in band table order
    pub bands: Vec<BandShare>,
}

impl RoseSector {
    /// Center bearing of the sector in degrees.
    pub fn center_deg(&self) -> f64 {
        self.index as f64 * SECTOR_WIDTH_DEG
    }

    pub fn band(&self, label: &str) -> Option<&BandShare> {
        self.bands.iter().find(|b| b.label == label)
    }
}

/// A normalized stacked angular histogram.
///
/// Only ever constructed with at least one valid sample; the "no data" case
/// is represented by the binner returning `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoseHistogram {
    pub sectors: Vec<RoseSector>,
    /// Samples with both direction and magnitude present
    pub total_valid: usize,
    /// Samples excluded for a missing direction or magnitude
    pub skipped: usize,
}

impl RoseHistogram {
    /// Largest sector percentage; the rose is scaled against this.
    pub fn max_percentage(&self) -> f64 {
        self.sectors.iter().map(|s| s.percentage).fold(0.0, f64::max)
    }

    /// Sector holding the most samples (lowest index wins ties).
    pub fn dominant_sector(&self) -> Option<&RoseSector> {
        self.sectors
            .iter()
            .fold(None, |best: Option<&RoseSector>, s| match best {
                Some(b) if b.count >= s.count => Some(b),
                _ => Some(s),
            })
    }

    pub fn sector(&self, index: usize) -> Option<&RoseSector> {
        self.sectors.get(index)
    }
}

// ============================================================================
// Binning
// ============================================================================

/// Sector index for a bearing, or `None` for a non-finite bearing.
///
/// Bearings outside `[0, 360)` wrap around.
pub fn sector_index(direction: f64) -> Option<usize> {
    if !direction.is_finite() {
        return None;
    }
    let shifted = (direction + HALF_SECTOR_DEG).rem_euclid(360.0);
    let index = (shifted / SECTOR_WIDTH_DEG).floor() as usize;
    Some(index.min(SECTOR_COUNT - 1))
}

/// Bin samples by their primary magnitude.
pub fn bin(samples: &[Sample], bands: &BandTable) -> Option<RoseHistogram> {
    bin_by(samples, bands, &Measure::Magnitude)
}

/// Bin samples by the channel `measure` selects (e.g. wave period).
pub fn bin_by(samples: &[Sample], bands: &BandTable, measure: &Measure) -> Option<RoseHistogram> {
    bin_pairs(samples.iter().map(|s| (s.direction(), s.measure(measure))), bands)
}

/// Bin raw `(direction, magnitude)` pairs.
///
/// Pairs with either side missing or non-finite are skipped and do not count
/// toward the denominator. Returns `None` when no pair is valid.
pub fn bin_pairs<I>(pairs: I, bands: &BandTable) -> Option<RoseHistogram>
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let band_count = bands.len();
    let mut sector_counts = [0usize; SECTOR_COUNT];
    let mut band_counts = vec![vec![0usize; band_count]; SECTOR_COUNT];
    let mut total_valid = 0usize;
    let mut skipped = 0usize;

    for (direction, magnitude) in pairs {
        let sector = direction.and_then(sector_index);
        let magnitude = magnitude.filter(|m| m.is_finite());
        let (Some(sector), Some(magnitude)) = (sector, magnitude) else {
            skipped += 1;
            continue;
        };
        sector_counts[sector] += 1;
        band_counts[sector][bands.band_index(magnitude)] += 1;
        total_valid += 1;
    }

    if total_valid == 0 {
        debug!(skipped, "No valid direction/magnitude pairs, rose has no data");
        return None;
    }

    let percent = |count: usize| count as f64 / total_valid as f64 * 100.0;
    let sectors = sector_counts
        .iter()
        .zip(band_counts)
        .enumerate()
        .map(|(index, (&count, per_band))| RoseSector {
            index,
            compass: COMPASS_POINTS[index],
            count,
            percentage: percent(count),
            bands: bands
                .labels()
                .zip(per_band)
                .map(|(label, band_count)| BandShare {
                    label: label.to_string(),
                    count: band_count,
                    percentage: percent(band_count),
                })
                .collect(),
        })
        .collect();

    Some(RoseHistogram {
        sectors,
        total_valid,
        skipped,
    })
}
