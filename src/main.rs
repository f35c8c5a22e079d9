//! buoy-stats - wind, wave and weather panels from an exported buoy feed
//!
//! Reads a JSON array of backend rows, reduces it to the selected look-back
//! window and prints the statistics for one panel, plus the rose and
//! direction strip when the domain has a direction.
//!
//! # Usage
//!
//! ```bash
//! # Wind panel over the configured default look-back
//! buoy-stats --input rows.json
//!
//! # Six-hour wave height panel as JSON
//! buoy-stats --input rows.json --domain wave-height --hours 6 --json
//!
//! # Wind rose binned by gust speed
//! buoy-stats --input rows.json --rose-field gust
//!
//! # Pressure panel with JSON log lines for a collector
//! buoy-stats --input rows.json --domain pressure --log-json
//! ```
//!
//! # Environment Variables
//!
//! - `BUOY_STATS_CONFIG`: Path to a `buoy_stats.toml` config file
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use buoy_stats::config::DashboardConfig;
use buoy_stats::ingest::{self, ColumnMap};
use buoy_stats::panel::{PanelSnapshot, PanelSpec};
use buoy_stats::rose::{RoseScale, COMPASS_POINTS};
use buoy_stats::types::{Domain, Measure};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "buoy-stats")]
#[command(about = "Wind/wave rose, window statistics and direction strip for a buoy feed")]
#[command(version)]
struct CliArgs {
    /// JSON file holding an array of backend rows
    #[arg(short, long)]
    input: PathBuf,

    /// Which panel to compute
    #[arg(short, long, value_enum, default_value_t = Domain::Wind)]
    domain: Domain,

    /// Look-back in hours (default: window.default_hours from config)
    #[arg(long)]
    hours: Option<f64>,

    /// Config file; overrides BUOY_STATS_CONFIG and ./buoy_stats.toml
    #[arg(short, long, env = "BUOY_STATS_CONFIG")]
    config: Option<PathBuf>,

    /// Bin the rose by a secondary channel (e.g. gust) instead of the magnitude
    #[arg(long, value_name = "CHANNEL")]
    rose_field: Option<String>,

    /// Print the snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Emit log lines as JSON objects
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = match &args.config {
        Some(path) => DashboardConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DashboardConfig::load(),
    };

    let mut spec = PanelSpec::from_config(&config, args.domain, args.hours)
        .context("Invalid panel settings")?;
    if let Some(channel) = args.rose_field.clone() {
        spec = spec.with_measure(Measure::Secondary(channel));
    }

    let report = ingest::load_file(&args.input, &ColumnMap::for_domain(args.domain))
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let snapshot = spec.compute(&report.samples, Utc::now());
    if snapshot.freshness.is_stale() {
        warn!(domain = %args.domain, freshness = ?snapshot.freshness, "Panel data is not current");
    }

    if args.json {
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;
        println!("{json}");
    } else {
        print_report(&snapshot, RoseScale::new(config.rose.max_radius));
    }

    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

// ============================================================================
// Text Report
// ============================================================================

fn print_report(snapshot: &PanelSnapshot, scale: RoseScale) {
    let unit = snapshot.domain.unit();

    println!("{} panel, last {} h", snapshot.domain, snapshot.look_back_hours);
    println!(
        "  samples: {} total, {} in window ({:?})",
        snapshot.sample_count, snapshot.window_count, snapshot.freshness
    );

    if let Some(latest) = &snapshot.latest {
        let from = if snapshot.domain.is_directional() {
            format!(" from {}", fmt_opt(latest.direction, 0))
        } else {
            String::new()
        };
        println!(
            "  latest:  {} {}{} at {}",
            fmt_opt(latest.magnitude, 1),
            unit,
            from,
            latest.timestamp.format("%Y-%m-%d %H:%M UTC")
        );
        for (name, value) in &latest.secondary {
            println!("  {:<14} {}", name, fmt_opt(*value, 1));
        }
        for (name, value) in &latest.bearings {
            println!("  {:<14} {}", name, fmt_opt(*value, 0));
        }
    }

    println!("\nStatistics (min / avg / max)");
    println!("  {:<14} {}", snapshot.domain.key(), snapshot.statistics.magnitude.display(2));
    for (name, stats) in &snapshot.statistics.secondary {
        println!("  {:<14} {}", name, stats.display(2));
    }

    if !snapshot.domain.is_directional() {
        return;
    }

    println!("\nRose");
    match &snapshot.rose {
        None => println!("  no data"),
        Some(rose) => {
            let wedges = scale.wedges(rose);
            for (sector, wedge) in rose.sectors.iter().zip(&wedges) {
                if sector.count == 0 {
                    continue;
                }
                println!(
                    "  {:<4} {:>5.1}%  r={:>6.1}  n={}",
                    sector.compass, sector.percentage, wedge.radius, sector.count
                );
            }
            if rose.skipped > 0 {
                println!("  ({} samples missing direction or magnitude)", rose.skipped);
            }
        }
    }

    println!("\nDirection strip");
    for point in &snapshot.strip {
        let compass = point
            .direction
            .and_then(buoy_stats::rose::sector_index)
            .map_or("-", |i| COMPASS_POINTS[i]);
        println!(
            "  {}  {:>4}  {}",
            point.timestamp.format("%m-%d %H:%M"),
            compass,
            fmt_opt(point.direction, 0)
        );
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_json_and_scalar_domain_flags() {
        let args = CliArgs::try_parse_from([
            "buoy-stats",
            "--input",
            "rows.json",
            "--domain",
            "pressure",
            "--log-json",
        ])
        .expect("valid arguments");
        assert!(args.log_json);
        assert_eq!(args.domain, Domain::Pressure);

        let args = CliArgs::try_parse_from(["buoy-stats", "-i", "rows.json"]).expect("valid");
        assert!(!args.log_json);
        assert_eq!(args.domain, Domain::Wind);
    }
}
