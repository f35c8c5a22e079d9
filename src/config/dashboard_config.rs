//! Dashboard Configuration - look-back choices, rose geometry, per-domain bands
//!
//! Every section is `#[serde(default)]`, so an empty file (or no file at all)
//! yields the values the dashboard ships with.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::decimate::{DecimateError, StripSampler};
use crate::freshness;
use crate::rose::scale::DEFAULT_MAX_RADIUS;
use crate::types::{BandError, BandTable, Domain, MagnitudeBand};
use crate::window::{LookBack, WindowError, STANDARD_LOOK_BACK_HOURS};

/// Environment variable pointing at a config file
pub const CONFIG_ENV_VAR: &str = "BUOY_STATS_CONFIG";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "buoy_stats.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration, built once at startup and passed down explicitly.
///
/// Load with `DashboardConfig::load()` which searches:
/// 1. `$BUOY_STATS_CONFIG`
/// 2. `./buoy_stats.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default)]
    pub rose: RoseConfig,

    #[serde(default)]
    pub domains: DomainsConfig,
}

impl DashboardConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults (with a warning) when a file is missing or invalid.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded dashboard config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from {CONFIG_ENV_VAR}, falling back"
                        );
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded dashboard config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    ///
    /// Unknown keys only produce warnings; value errors are fatal.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Dashboard config saved");
        Ok(())
    }

    /// Validate every value; collects all problems before failing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let w = &self.window;
        if let Err(e) = LookBack::hours(w.default_hours) {
            errors.push(format!("window.default_hours: {e}"));
        }
        if w.choices.is_empty() {
            errors.push("window.choices must not be empty".to_string());
        }
        for hours in &w.choices {
            if let Err(e) = LookBack::hours(*hours) {
                errors.push(format!("window.choices: {e}"));
            }
        }
        if !w.choices.is_empty() && !w.choices.contains(&w.default_hours) {
            errors.push(format!(
                "window.default_hours ({}) must be one of window.choices {:?}",
                w.default_hours, w.choices
            ));
        }

        if !self.rose.max_radius.is_finite() || self.rose.max_radius <= 0.0 {
            errors.push(format!(
                "rose.max_radius must be a positive finite number, got {}",
                self.rose.max_radius
            ));
        }

        for domain in Domain::ALL {
            let section = self.domains.get(domain);
            let name = domain.key();
            if let Some(bands) = &section.bands {
                if let Err(e) = BandTable::from_bands(bands.clone()) {
                    errors.push(format!("domains.{name}.bands: {e}"));
                }
            }
            if section.stale_after_minutes == Some(0) {
                errors.push(format!("domains.{name}.stale_after_minutes must be > 0"));
            }
            if let Err(e) = self.strip_sampler(domain) {
                errors.push(format!("domains.{name}.strip_points: {e}"));
            }
            if !domain.is_directional() {
                if section.bands.is_some() {
                    errors.push(format!("domains.{name}.bands: {name} has no direction to bin"));
                }
                if section.strip_points.is_some() {
                    errors.push(format!(
                        "domains.{name}.strip_points: {name} has no direction strip"
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    // --- Resolved accessors -------------------------------------------------

    pub fn default_look_back(&self) -> Result<LookBack, WindowError> {
        LookBack::hours(self.window.default_hours)
    }

    /// Band table for the domain's rose; `None` for non-directional domains.
    pub fn band_table(&self, domain: Domain) -> Result<Option<BandTable>, BandError> {
        if !domain.is_directional() {
            return Ok(None);
        }
        match &self.domains.get(domain).bands {
            Some(bands) => BandTable::from_bands(bands.clone()).map(Some),
            None => Ok(domain.default_bands()),
        }
    }

    /// Direction strip sampler; `None` for non-directional domains.
    pub fn strip_sampler(&self, domain: Domain) -> Result<Option<StripSampler>, DecimateError> {
        if !domain.is_directional() {
            return Ok(None);
        }
        self.domains
            .get(domain)
            .strip_points
            .or_else(|| domain.default_strip_points())
            .map(StripSampler::new)
            .transpose()
    }

    pub fn stale_after(&self, domain: Domain) -> TimeDelta {
        freshness::minutes(
            self.domains
                .get(domain)
                .stale_after_minutes
                .unwrap_or_else(|| domain.default_stale_after_minutes()),
        )
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config parse error ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Config serialization error: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Config validation failed:\n{}", format_errors(.0))]
    Validation(Vec<String>),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Bands(#[from] BandError),

    #[error(transparent)]
    Strip(#[from] DecimateError),
}

fn format_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Sections
// ============================================================================

/// Look-back selector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Look-back used when none is requested (hours)
    pub default_hours: f64,
    /// Choices offered by the selector (hours)
    pub choices: Vec<f64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_hours: 24.0,
            choices: STANDARD_LOOK_BACK_HOURS.to_vec(),
        }
    }
}

/// Rose chart geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoseConfig {
    /// Radius reached by the largest sector
    pub max_radius: f64,
}

impl Default for RoseConfig {
    fn default() -> Self {
        Self {
            max_radius: DEFAULT_MAX_RADIUS,
        }
    }
}

/// Per-domain overrides; anything left unset uses the domain's built-in value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainsConfig {
    pub wind: DomainConfig,
    pub wave_height: DomainConfig,
    pub wave_period: DomainConfig,
    pub pressure: DomainConfig,
    pub temperature: DomainConfig,
}

impl DomainsConfig {
    pub const fn get(&self, domain: Domain) -> &DomainConfig {
        match domain {
            Domain::Wind => &self.wind,
            Domain::WaveHeight => &self.wave_height,
            Domain::WavePeriod => &self.wave_period,
            Domain::Pressure => &self.pressure,
            Domain::Temperature => &self.temperature,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_after_minutes: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_points: Option<usize>,

    /// Band table; the entry without `upper` is the unbounded top band
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<MagnitudeBand>>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_target(config: &DashboardConfig, domain: Domain) -> Option<usize> {
        config
            .strip_sampler(domain)
            .expect("valid strip size")
            .map(|s| s.target())
    }

    #[test]
    fn test_default_config_validates() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: DashboardConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.window.default_hours, 24.0);
        assert_eq!(config.window.choices, vec![6.0, 12.0, 24.0]);
        assert_eq!(config.rose.max_radius, 120.0);
    }

    #[test]
    fn test_domain_defaults_resolve() {
        let config = DashboardConfig::default();
        assert_eq!(config.stale_after(Domain::Wind), TimeDelta::minutes(30));
        assert_eq!(config.stale_after(Domain::WaveHeight), TimeDelta::minutes(35));
        assert_eq!(config.stale_after(Domain::Pressure), TimeDelta::minutes(30));
        assert_eq!(strip_target(&config, Domain::Wind), Some(12));
        assert_eq!(strip_target(&config, Domain::WavePeriod), Some(10));
        assert_eq!(strip_target(&config, Domain::Temperature), None);
        assert_eq!(config.band_table(Domain::WaveHeight), Ok(Some(BandTable::wave_height())));
        assert_eq!(config.band_table(Domain::Pressure), Ok(None));
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[window]
default_hours = 12.0

[domains.wind]
strip_points = 8
bands = [
    { upper = 5.0, label = "breeze" },
    { label = "storm" },
]
"#;
        let config: DashboardConfig = toml::from_str(toml_str).expect("partial TOML should parse");
        assert!(config.validate().is_ok());
        assert_eq!(config.default_look_back().map(LookBack::as_hours), Ok(12.0));
        assert_eq!(strip_target(&config, Domain::Wind), Some(8));
        // Non-overridden values retain defaults
        assert_eq!(config.stale_after(Domain::Wind), TimeDelta::minutes(30));
        let bands = config
            .band_table(Domain::Wind)
            .expect("valid bands")
            .expect("wind has a rose");
        assert_eq!(bands.labels().collect::<Vec<_>>(), vec!["breeze", "storm"]);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = DashboardConfig::default();
        config.window.default_hours = 48.0;
        config.rose.max_radius = 0.0;
        config.domains.wave_height.strip_points = Some(1);
        config.domains.wave_period.stale_after_minutes = Some(0);
        config.domains.wind.bands = Some(vec![MagnitudeBand::bounded(3.0, "only")]);

        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expected validation errors");
        };
        assert!(errors.iter().any(|e| e.contains("must be one of window.choices")));
        assert!(errors.iter().any(|e| e.contains("rose.max_radius")));
        assert!(errors.iter().any(|e| e.contains("wave_height.strip_points")));
        assert!(errors.iter().any(|e| e.contains("wave_period.stale_after_minutes")));
        assert!(errors.iter().any(|e| e.contains("wind.bands")));
    }

    #[test]
    fn test_scalar_domains_reject_rose_settings() {
        let mut config = DashboardConfig::default();
        config.domains.pressure.bands = Some(BandTable::wind_speed().bands().to_vec());
        config.domains.temperature.strip_points = Some(6);
        config.domains.temperature.stale_after_minutes = Some(45);

        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 2, "errors: {errors:?}");
        assert!(errors.iter().any(|e| e.starts_with("domains.pressure.bands")));
        assert!(errors.iter().any(|e| e.starts_with("domains.temperature.strip_points")));
        assert_eq!(config.stale_after(Domain::Temperature), TimeDelta::minutes(45));
    }

    #[test]
    fn test_validation_rejects_non_positive_hours() {
        let mut config = DashboardConfig::default();
        config.window.choices = vec![-6.0, 24.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_toml() {
        let mut original = DashboardConfig::default();
        original.domains.wave_period.bands = Some(BandTable::wave_period().bands().to_vec());
        original.domains.wind.stale_after_minutes = Some(20);
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped: DashboardConfig =
            toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(original, roundtripped);
    }
}
