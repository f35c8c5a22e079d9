//! Dashboard domains: which quantity a panel reports on

use serde::{Deserialize, Serialize};

use super::BandTable;

/// A quantity with its own panel, stale threshold and ingest columns.
///
/// Directional domains also get a rose and a direction strip; pressure and
/// temperature only get statistics and a latest reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Wind speed (m/s) by wind direction
    Wind,
    /// Significant wave height (m) by wave direction
    WaveHeight,
    /// Mean wave period (s) by wave direction
    WavePeriod,
    /// Atmospheric pressure (hPa)
    Pressure,
    /// Air temperature (°C)
    Temperature,
}

impl Domain {
    pub const ALL: [Self; 5] = [
        Self::Wind,
        Self::WaveHeight,
        Self::WavePeriod,
        Self::Pressure,
        Self::Temperature,
    ];

    /// Config section name (`[domains.<key>]`).
    pub const fn key(self) -> &'static str {
        match self {
            Self::Wind => "wind",
            Self::WaveHeight => "wave_height",
            Self::WavePeriod => "wave_period",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Wind => "m/s",
            Self::WaveHeight => "m",
            Self::WavePeriod => "s",
            Self::Pressure => "hPa",
            Self::Temperature => "°C",
        }
    }

    /// Whether samples carry a direction (rose and strip apply).
    pub const fn is_directional(self) -> bool {
        matches!(self, Self::Wind | Self::WaveHeight | Self::WavePeriod)
    }

    /// Built-in band table; `None` for non-directional domains.
    pub fn default_bands(self) -> Option<BandTable> {
        match self {
            Self::Wind => Some(BandTable::wind_speed()),
            Self::WaveHeight => Some(BandTable::wave_height()),
            Self::WavePeriod => Some(BandTable::wave_period()),
            Self::Pressure | Self::Temperature => None,
        }
    }

    /// Minutes after which the latest reading is flagged as stale.
    /// The wave feed reports less often than the others.
    pub const fn default_stale_after_minutes(self) -> u32 {
        match self {
            Self::Wind | Self::Pressure | Self::Temperature => 30,
            Self::WaveHeight | Self::WavePeriod => 35,
        }
    }

    /// Number of arrows shown in the direction strip; `None` when there is
    /// no direction to show.
    pub const fn default_strip_points(self) -> Option<usize> {
        match self {
            Self::Wind => Some(12),
            Self::WaveHeight | Self::WavePeriod => Some(10),
            Self::Pressure | Self::Temperature => None,
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
