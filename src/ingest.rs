//! Buoy feed ingest
//!
//! Converts rows as served by the dashboard's data endpoints into [`Sample`]s.
//! Rows are JSON objects keyed by the buoy's channel mnemonics:
//!
//! | Column       | Meaning                     | Unit on the wire |
//! |--------------|-----------------------------|------------------|
//! | `created_at` | observation time            | RFC 3339         |
//! | `WSPD`/`WDIR`| wind speed / direction      | m/s, degrees     |
//! | `GSPD`/`GDIR`| gust speed / direction      | m/s, degrees     |
//! | `VAVH`       | significant wave height     | cm               |
//! | `VMXL`       | maximum wave height         | cm               |
//! | `VAVT`       | mean wave period            | s                |
//! | `VDIR`       | wave direction              | degrees          |
//! | `ATMS`       | atmospheric pressure        | hPa              |
//! | `DRYT`       | air temperature             | °C               |
//!
//! Values may arrive as numbers, numeric strings or `null`; anything that does
//! not parse to a finite number becomes `None`. The endpoints return newest
//! first, so the output is re-sorted oldest first.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::{Domain, Sample};

/// Centimetres to metres (wave heights)
const CM_TO_M: f64 = 0.01;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error reading {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of rows, got {0}")]
    NotAnArray(&'static str),
}

// ============================================================================
// Column Mapping
// ============================================================================

/// A source column plus the factor that converts it to display units.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub column: String,
    pub scale: f64,
}

impl ColumnSpec {
    pub fn raw(column: impl Into<String>) -> Self {
        Self::scaled(column, 1.0)
    }

    pub fn scaled(column: impl Into<String>, scale: f64) -> Self {
        Self {
            column: column.into(),
            scale,
        }
    }

    fn read(&self, row: &serde_json::Map<String, Value>) -> Option<f64> {
        row.get(&self.column).and_then(parse_number).map(|v| v * self.scale)
    }
}

/// How one feed's row columns map onto [`Sample`] channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub timestamp: String,
    pub magnitude: ColumnSpec,
    pub direction: Option<ColumnSpec>,
    /// Scalar channels; these get window statistics
    pub secondary: Vec<(String, ColumnSpec)>,
    /// Bearing channels; latest value only
    pub bearings: Vec<(String, ColumnSpec)>,
}

impl ColumnMap {
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Wind => Self {
                secondary: vec![("gust".into(), ColumnSpec::raw("GSPD"))],
                bearings: vec![("gust_direction".into(), ColumnSpec::raw("GDIR"))],
                ..Self::directional(ColumnSpec::raw("WSPD"), "WDIR")
            },
            Domain::WaveHeight => Self {
                secondary: vec![
                    ("max_height".into(), ColumnSpec::scaled("VMXL", CM_TO_M)),
                    ("period".into(), ColumnSpec::raw("VAVT")),
                ],
                ..Self::directional(ColumnSpec::scaled("VAVH", CM_TO_M), "VDIR")
            },
            Domain::WavePeriod => Self {
                secondary: vec![
                    ("height".into(), ColumnSpec::scaled("VAVH", CM_TO_M)),
                    ("max_height".into(), ColumnSpec::scaled("VMXL", CM_TO_M)),
                ],
                ..Self::directional(ColumnSpec::raw("VAVT"), "VDIR")
            },
            Domain::Pressure => Self::scalar("ATMS"),
            Domain::Temperature => Self::scalar("DRYT"),
        }
    }

    fn directional(magnitude: ColumnSpec, direction: &str) -> Self {
        Self {
            direction: Some(ColumnSpec::raw(direction)),
            ..Self::scalar_spec(magnitude)
        }
    }

    /// A non-directional feed such as pressure (`ATMS`) or temperature (`DRYT`).
    pub fn scalar(column: impl Into<String>) -> Self {
        Self::scalar_spec(ColumnSpec::raw(column))
    }

    fn scalar_spec(magnitude: ColumnSpec) -> Self {
        Self {
            timestamp: "created_at".into(),
            magnitude,
            direction: None,
            secondary: Vec::new(),
            bearings: Vec::new(),
        }
    }
}

// ============================================================================
// Ingest
// ============================================================================

/// Result of converting a batch of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// Samples sorted oldest first
    pub samples: Vec<Sample>,
    /// Rows without a usable timestamp (or not JSON objects)
    pub dropped_rows: usize,
    /// Whether the rows had to be re-sorted
    pub reordered: bool,
}

/// Convert parsed rows into samples.
pub fn ingest_rows(rows: &[Value], map: &ColumnMap) -> IngestReport {
    let mut samples = Vec::with_capacity(rows.len());
    let mut dropped_rows = 0usize;

    for row in rows {
        match convert_row(row, map) {
            Some(sample) => samples.push(sample),
            None => dropped_rows += 1,
        }
    }

    let reordered = !crate::window::is_time_ordered(&samples);
    if reordered {
        samples.sort_by_key(|s| s.timestamp);
        debug!(samples = samples.len(), "Re-sorted rows oldest first");
    }
    if dropped_rows > 0 {
        warn!(
            dropped_rows,
            timestamp_column = %map.timestamp,
            "Dropped rows without a usable timestamp"
        );
    }

    IngestReport {
        samples,
        dropped_rows,
        reordered,
    }
}

/// Parse a JSON document holding an array of rows.
pub fn ingest_json(json: &str, map: &ColumnMap) -> Result<IngestReport, IngestError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(rows) => Ok(ingest_rows(&rows, map)),
        other => Err(IngestError::NotAnArray(json_kind(&other))),
    }
}

/// Read and parse a JSON export from disk.
pub fn load_file(path: &Path, map: &ColumnMap) -> Result<IngestReport, IngestError> {
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let report = ingest_json(&contents, map)?;
    info!(
        path = %path.display(),
        samples = report.samples.len(),
        dropped = report.dropped_rows,
        "Loaded buoy rows"
    );
    Ok(report)
}

fn convert_row(row: &Value, map: &ColumnMap) -> Option<Sample> {
    let fields = row.as_object()?;
    let timestamp = fields.get(&map.timestamp).and_then(parse_timestamp)?;

    let mut sample = Sample::new(
        timestamp,
        map.magnitude.read(fields),
        map.direction.as_ref().and_then(|d| d.read(fields)),
    );
    for (name, spec) in &map.secondary {
        sample.secondary.insert(name.clone(), spec.read(fields));
    }
    for (name, spec) in &map.bearings {
        sample.bearings.insert(name.clone(), spec.read(fields));
    }
    Some(sample)
}

/// Lenient numeric parse: numbers and numeric strings, finite only.
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Accepts RFC 3339 strings, zone-less ISO strings (taken as UTC) and epoch
/// milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                        .ok()
                        .map(|naive| naive.and_utc())
                })
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
