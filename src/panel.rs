//! Panel composition
//!
//! One dashboard panel is the window reducer, the circular binner and the
//! decimator run over the same sample set, plus a freshness verdict.
//! Non-directional panels (pressure, temperature) skip the rose and the
//! strip. `PanelSpec::compute` is pure: `now` is passed in and the result
//! depends on nothing else.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{ConfigError, DashboardConfig};
use crate::decimate::StripSampler;
use crate::freshness::{self, Freshness};
use crate::rose::{self, RoseHistogram};
use crate::types::{finite, BandTable, Domain, Measure, Sample};
use crate::window::{self, LookBack, WindowStatistics};

// ============================================================================
// Panel Definition
// ============================================================================

/// Everything needed to turn a sample set into a panel snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    pub domain: Domain,
    /// Rose bands; `None` means no rose
    pub bands: Option<BandTable>,
    /// Channel the rose bins by magnitude
    pub measure: Measure,
    pub look_back: LookBack,
    /// Direction strip sampler; `None` means no strip
    pub strip: Option<StripSampler>,
    pub stale_after: TimeDelta,
}

impl PanelSpec {
    /// Built-in settings for `domain` with the given look-back.
    pub fn for_domain(domain: Domain, look_back: LookBack) -> Self {
        Self {
            domain,
            bands: domain.default_bands(),
            measure: Measure::Magnitude,
            look_back,
            strip: domain.default_strip_points().map(StripSampler::saturating),
            stale_after: freshness::minutes(domain.default_stale_after_minutes()),
        }
    }

    /// Settings for `domain` resolved from `config`. `hours` overrides the
    /// configured default look-back.
    pub fn from_config(
        config: &DashboardConfig,
        domain: Domain,
        hours: Option<f64>,
    ) -> Result<Self, ConfigError> {
        let look_back = match hours {
            Some(h) => LookBack::hours(h)?,
            None => config.default_look_back()?,
        };
        Ok(Self {
            domain,
            bands: config.band_table(domain)?,
            measure: Measure::Magnitude,
            look_back,
            strip: config.strip_sampler(domain)?,
            stale_after: config.stale_after(domain),
        })
    }

    /// Bin the rose by a secondary channel instead of the magnitude.
    #[must_use]
    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measure = measure;
        self
    }

    /// Reduce, bin and decimate `samples` as of `now`.
    pub fn compute(&self, samples: &[Sample], now: DateTime<Utc>) -> PanelSnapshot {
        let report = window::reduce(samples, self.look_back);
        let window_count = report.len();
        let rose = self
            .bands
            .as_ref()
            .and_then(|bands| rose::bin_by(&report.samples, bands, &self.measure));
        let strip: Vec<StripPoint> = self
            .strip
            .map(|sampler| {
                sampler
                    .sample(&report.samples)
                    .into_iter()
                    .map(|s| StripPoint {
                        timestamp: s.timestamp,
                        direction: s.direction(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let latest = samples.last().map(LatestReading::from);
        let latest_at = latest.as_ref().map(|l| l.timestamp);
        let freshness = Freshness::assess(latest_at, now, self.stale_after);

        debug!(
            domain = %self.domain,
            hours = self.look_back.as_hours(),
            samples = samples.len(),
            window = window_count,
            strip = strip.len(),
            "Panel computed"
        );

        PanelSnapshot {
            domain: self.domain,
            look_back_hours: self.look_back.as_hours(),
            cutoff: report.cutoff,
            sample_count: samples.len(),
            window_count,
            latest,
            freshness,
            statistics: report.statistics,
            rose,
            strip,
        }
    }
}

// ============================================================================
// Snapshot Types
// ============================================================================

/// Newest reading in the feed, shown as the panel headline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReading {
    pub timestamp: DateTime<Utc>,
    pub magnitude: Option<f64>,
    pub direction: Option<f64>,
    /// Latest scalar channels (gust, max_height, ...)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub secondary: BTreeMap<String, Option<f64>>,
    /// Latest bearing channels (gust_direction)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub bearings: BTreeMap<String, Option<f64>>,
}

impl From<&Sample> for LatestReading {
    fn from(sample: &Sample) -> Self {
        let clean = |channels: &BTreeMap<String, Option<f64>>| {
            channels
                .iter()
                .map(|(name, value)| (name.clone(), finite(*value)))
                .collect()
        };
        Self {
            timestamp: sample.timestamp,
            magnitude: sample.magnitude(),
            direction: sample.direction(),
            secondary: clean(&sample.secondary),
            bearings: clean(&sample.bearings),
        }
    }
}

/// One arrow in the direction strip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StripPoint {
    pub timestamp: DateTime<Utc>,
    pub direction: Option<f64>,
}

/// Computed state of one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub domain: Domain,
    pub look_back_hours: f64,
    pub cutoff: Option<DateTime<Utc>>,
    /// Samples in the full input
    pub sample_count: usize,
    /// Samples inside the look-back window
    pub window_count: usize,
    pub latest: Option<LatestReading>,
    pub freshness: Freshness,
    pub statistics: WindowStatistics,
    /// `None` when the window holds no sample with both channels, or the
    /// domain has no direction
    pub rose: Option<RoseHistogram>,
    pub strip: Vec<StripPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;
    const BASE_MS: i64 = 1_700_000_000_000;

    fn hourly(count: i64) -> Vec<Sample> {
        (0..count)
            .map(|h| {
                Sample::from_millis(BASE_MS + h * HOUR_MS, Some(h as f64), Some((h * 10) as f64))
                    .expect("valid timestamp")
                    .with_secondary("gust", Some(h as f64 + 2.0))
            })
            .collect()
    }

    fn at_hour(h: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(BASE_MS + h * HOUR_MS).expect("valid timestamp")
    }

    fn hours(h: f64) -> LookBack {
        LookBack::hours(h).expect("valid look-back")
    }

    #[test]
    fn test_compute_composes_window_rose_and_strip() {
        let samples = hourly(48);
        let spec = PanelSpec::for_domain(Domain::Wind, hours(24.0));
        let snapshot = spec.compute(&samples, at_hour(47));

        assert_eq!(snapshot.sample_count, 48);
        // hours 23..=47
        assert_eq!(snapshot.window_count, 25);
        assert_eq!(snapshot.statistics.magnitude.min(), Some(23.0));
        assert_eq!(snapshot.statistics.magnitude.max(), Some(47.0));
        assert_eq!(snapshot.statistics.channel("gust").and_then(|g| g.max()), Some(49.0));

        let rose = snapshot.rose.expect("window has data");
        assert_eq!(rose.total_valid, 25);

        assert_eq!(snapshot.strip.len(), 12);
        assert_eq!(snapshot.strip.first().map(|p| p.timestamp), Some(at_hour(23)));
        assert_eq!(snapshot.strip.last().map(|p| p.timestamp), Some(at_hour(47)));
        assert_eq!(snapshot.freshness, Freshness::Fresh);
    }

    #[test]
    fn test_latest_reading_and_staleness() {
        let samples = hourly(3);
        let spec = PanelSpec::for_domain(Domain::WaveHeight, hours(6.0));
        let snapshot = spec.compute(&samples, at_hour(3));
        let latest = snapshot.latest.expect("has samples");
        assert_eq!(latest.magnitude, Some(2.0));
        assert_eq!(latest.direction, Some(20.0));
        assert_eq!(latest.secondary.get("gust"), Some(&Some(4.0)));
        // last reading is an hour old, threshold is 35 min
        assert_eq!(snapshot.freshness, Freshness::Stale);
    }

    #[test]
    fn test_gust_direction_is_headline_only() {
        let samples = vec![
            Sample::from_millis(BASE_MS, Some(4.0), Some(350.0))
                .expect("valid timestamp")
                .with_secondary("gust", Some(7.0))
                .with_bearing("gust_direction", Some(350.0)),
            Sample::from_millis(BASE_MS + HOUR_MS, Some(5.0), Some(0.0))
                .expect("valid timestamp")
                .with_secondary("gust", Some(8.5))
                .with_bearing("gust_direction", Some(10.0)),
        ];
        let spec = PanelSpec::for_domain(Domain::Wind, hours(24.0));
        let snapshot = spec.compute(&samples, at_hour(1));

        // a linear mean of 350 and 10 would point due south
        assert!(snapshot.statistics.channel("gust_direction").is_none());
        assert_eq!(snapshot.statistics.secondary.keys().collect::<Vec<_>>(), vec!["gust"]);

        let latest = snapshot.latest.expect("has samples");
        assert_eq!(latest.secondary.get("gust"), Some(&Some(8.5)));
        assert_eq!(latest.bearings.get("gust_direction"), Some(&Some(10.0)));
    }

    #[test]
    fn test_scalar_domain_has_stats_but_no_rose_or_strip() {
        let samples: Vec<Sample> = [1012.0, 1013.5, 1011.0]
            .iter()
            .zip(0..)
            .map(|(&hpa, h)| {
                Sample::from_millis(BASE_MS + h * HOUR_MS, Some(hpa), None)
                    .expect("valid timestamp")
            })
            .collect();
        let spec = PanelSpec::for_domain(Domain::Pressure, hours(24.0));
        assert!(spec.bands.is_none());
        assert!(spec.strip.is_none());

        let snapshot = spec.compute(&samples, at_hour(2));
        assert!(snapshot.rose.is_none());
        assert!(snapshot.strip.is_empty());
        assert_eq!(snapshot.statistics.magnitude.min(), Some(1011.0));
        assert_eq!(snapshot.statistics.magnitude.max(), Some(1013.5));
        assert_eq!(snapshot.freshness, Freshness::Fresh);

        // 30 minutes stale threshold
        let later = at_hour(2) + TimeDelta::minutes(30);
        assert_eq!(spec.compute(&samples, later).freshness, Freshness::Stale);
    }

    #[test]
    fn test_empty_input_yields_no_data_panel() {
        let spec = PanelSpec::for_domain(Domain::WavePeriod, hours(12.0));
        let snapshot = spec.compute(&[], at_hour(0));
        assert_eq!(snapshot.freshness, Freshness::NoData);
        assert!(snapshot.rose.is_none());
        assert!(snapshot.strip.is_empty());
        assert!(snapshot.latest.is_none());
        assert!(!snapshot.statistics.magnitude.is_available());
    }

    #[test]
    fn test_rose_by_secondary_measure() {
        let samples = hourly(5);
        let spec = PanelSpec::for_domain(Domain::Wind, hours(24.0))
            .with_measure(Measure::Secondary("gust".to_string()));
        let rose = spec.compute(&samples, at_hour(4)).rose.expect("has data");
        // sector 0 holds hours 0 and 1, gusting 2 and 3 m/s
        let north = rose.sector(0).expect("sector 0");
        assert_eq!(north.bands[0].count, 1);
        assert_eq!(rose.total_valid, 5);
    }

    #[test]
    fn test_from_config_overrides() {
        let mut config = DashboardConfig::default();
        config.domains.wind.strip_points = Some(4);
        config.domains.wind.stale_after_minutes = Some(90);
        let spec = PanelSpec::from_config(&config, Domain::Wind, Some(6.0)).expect("valid config");
        assert_eq!(spec.strip.map(|s| s.target()), Some(4));
        assert_eq!(spec.stale_after, TimeDelta::minutes(90));
        assert_eq!(spec.look_back.as_hours(), 6.0);

        let default_hours =
            PanelSpec::from_config(&config, Domain::Wind, None).expect("valid config");
        assert_eq!(default_hours.look_back.as_hours(), 24.0);

        let temperature =
            PanelSpec::from_config(&config, Domain::Temperature, None).expect("valid config");
        assert!(temperature.bands.is_none() && temperature.strip.is_none());

        assert!(matches!(
            PanelSpec::from_config(&config, Domain::Wind, Some(-1.0)),
            Err(ConfigError::Window(_))
        ));
    }
}
