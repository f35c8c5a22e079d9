//! Shared data structures for buoy dashboard aggregation
//!
//! - `Sample`: one buoy observation with optional channels
//! - `BandTable`: magnitude bands used to stack rose sectors
//! - `Domain`: wind, wave, pressure and temperature panel kinds

mod bands;
mod domain;
mod sample;

pub use bands::*;
pub use domain::*;
pub use sample::*;
