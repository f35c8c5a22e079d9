//! buoy-stats: aggregation core for a buoy wind/wave dashboard
//!
//! Turns a time series of buoy observations into what the dashboard panels
//! display.
//!
//! ## Components
//!
//! - **Circular Binner** (`rose`): 16-sector direction histogram stacked by
//!   magnitude band, normalized to percentages, plus radial scaling
//! - **Rolling Window Reducer** (`window`): look-back filter anchored on the
//!   newest sample, with min/max/average statistics per channel
//! - **Decimator** (`decimate`): evenly spaced direction strip
//! - **Panel** (`panel`): the three run together for one domain, with a
//!   staleness verdict (`freshness`)
//!
//! Everything here is synchronous and pure; callers supply `now` and the
//! samples, and own the results.

pub mod config;
pub mod decimate;
pub mod freshness;
pub mod ingest;
pub mod panel;
pub mod rose;
pub mod types;
pub mod window;

pub use config::{ConfigError, DashboardConfig};
pub use decimate::{decimate, DecimateError, StripSampler};
pub use freshness::Freshness;
pub use ingest::{ColumnMap, IngestError, IngestReport};
pub use panel::{LatestReading, PanelSnapshot, PanelSpec, StripPoint};
pub use rose::{RoseHistogram, RoseScale, RoseSector};
pub use types::{BandError, BandTable, Domain, MagnitudeBand, Measure, Sample};
pub use window::{reduce, FieldStats, LookBack, WindowError, WindowReport, WindowStatistics};
