//! Radial scaling for stacked rose wedges
//!
//! Radii are linear in percentage and normalized so the sector with the
//! largest total reaches `max_radius`. Bands stack outward in table order,
//! so the outer edge of the last segment is the sector's full radius.

use serde::Serialize;

use super::{RoseHistogram, HALF_SECTOR_DEG, SECTOR_WIDTH_DEG};

/// Default outer radius used by the dashboard's 300×300 rose
pub const DEFAULT_MAX_RADIUS: f64 = 120.0;

/// One band's slice of a wedge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WedgeSegment {
    pub label: String,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

/// Geometry for one sector: angular span plus stacked band segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoseWedge {
    pub index: usize,
    /// Bearing where the wedge starts (degrees, may be negative for sector 0)
    pub start_deg: f64,
    pub end_deg: f64,
    pub radius: f64,
    pub segments: Vec<WedgeSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoseScale {
    max_radius: f64,
}

impl Default for RoseScale {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RADIUS)
    }
}

impl RoseScale {
    pub const fn new(max_radius: f64) -> Self {
        Self { max_radius }
    }

    pub const fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Radius for `percentage` when the largest sector holds `peak` percent.
    pub fn radius_for(&self, percentage: f64, peak: f64) -> f64 {
        if peak > 0.0 {
            percentage * self.max_radius / peak
        } else {
            0.0
        }
    }

    pub fn wedges(&self, rose: &RoseHistogram) -> Vec<RoseWedge> {
        let peak = rose.max_percentage();
        rose.sectors
            .iter()
            .map(|sector| {
                let center = sector.center_deg();
                let mut inner = 0.0;
                let segments = sector
                    .bands
                    .iter()
                    .map(|band| {
                        let outer = inner + self.radius_for(band.percentage, peak);
                        let segment = WedgeSegment {
                            label: band.label.clone(),
                            inner_radius: inner,
                            outer_radius: outer,
                        };
                        inner = outer;
                        segment
                    })
                    .collect();
                RoseWedge {
                    index: sector.index,
                    start_deg: center - HALF_SECTOR_DEG,
                    end_deg: center - HALF_SECTOR_DEG + SECTOR_WIDTH_DEG,
                    radius: self.radius_for(sector.percentage, peak),
                    segments,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rose::bin_pairs;
    use crate::types::BandTable;

    #[test]
    fn test_largest_sector_reaches_max_radius() {
        let rose = bin_pairs(
            vec![
                (Some(0.0), Some(1.0)),
                (Some(0.0), Some(5.0)),
                (Some(90.0), Some(3.0)),
            ],
            &BandTable::wind_speed(),
        )
        .expect("has data");
        let wedges = RoseScale::new(100.0).wedges(&rose);
        assert_eq!(wedges.len(), 16);
        assert!((wedges[0].radius - 100.0).abs() < 1e-9);
        assert!((wedges[4].radius - 50.0).abs() < 1e-9);
        assert_eq!(wedges[8].radius, 0.0);
    }

    #[test]
    fn test_segments_stack_to_sector_radius() {
        let rose = bin_pairs(
            vec![
                (Some(45.0), Some(1.0)),
                (Some(45.0), Some(7.0)),
                (Some(45.0), Some(20.0)),
                (Some(200.0), Some(9.0)),
            ],
            &BandTable::wind_speed(),
        )
        .expect("has data");
        for wedge in RoseScale::default().wedges(&rose) {
            let last = wedge.segments.last().expect("one segment per band");
            assert!((last.outer_radius - wedge.radius).abs() < 1e-9);
            for pair in wedge.segments.windows(2) {
                assert!((pair[0].outer_radius - pair[1].inner_radius).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_wedge_spans_are_centered() {
        let rose =
            bin_pairs(vec![(Some(0.0), Some(1.0))], &BandTable::wind_speed()).expect("has data");
        let wedges = RoseScale::default().wedges(&rose);
        assert!((wedges[0].start_deg + 11.25).abs() < 1e-12);
        assert!((wedges[0].end_deg - 11.25).abs() < 1e-12);
        assert!((wedges[1].start_deg - 11.25).abs() < 1e-12);
    }

    #[test]
    fn test_zero_peak_yields_zero_radius() {
        assert_eq!(RoseScale::default().radius_for(10.0, 0.0), 0.0);
    }
}
