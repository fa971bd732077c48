//! One-shot proximity scan.
//!
//! Queries the aircraft source once, classifies the result against the given
//! center and radii and prints the scan summary as JSON. No audio is played.
//!
//! Usage:
//!   cargo run -p alarm-server --bin scan_once -- --lat 51.47 --lon -0.45

use alarm_core::{AlarmSettings, BoundingBox, ClipBank, DataSource, ProximityEngine};
use alarm_opensky::{OpenSkyClient, DEFAULT_BASE_URL};
use alarm_server::actuators::LogActuator;
use anyhow::{bail, Result};
use chrono::Utc;
use clap::Parser;
use std::time::Duration;

/// Run a single flight scan and print the summary
#[derive(Parser, Debug)]
#[command(author, version, about = "Run a single proximity scan and print the summary")]
struct Args {
    /// Center latitude in degrees
    #[arg(long, default_value_t = AlarmSettings::default().latitude)]
    lat: f64,

    /// Center longitude in degrees
    #[arg(long, default_value_t = AlarmSettings::default().longitude)]
    lon: f64,

    /// Level 1 radius in km
    #[arg(long, default_value_t = 30.0)]
    r1: f64,

    /// Level 2 radius in km
    #[arg(long, default_value_t = 50.0)]
    r2: f64,

    /// Level 3 radius in km
    #[arg(long, default_value_t = 70.0)]
    r3: f64,

    /// Query box half-width in degrees
    #[arg(long, default_value_t = 1.0)]
    margin: f64,

    /// Aircraft source base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = AlarmSettings {
        latitude: args.lat,
        longitude: args.lon,
        radius_level1: args.r1,
        radius_level2: args.r2,
        radius_level3: args.r3,
        sound_warning: false,
        bbox_margin_deg: args.margin,
        ..AlarmSettings::default()
    };
    for warning in settings.validate()? {
        eprintln!("warning: {}", warning);
    }

    let client = OpenSkyClient::new(args.url, Duration::from_secs(args.timeout))?;
    let bbox = BoundingBox::around(settings.center(), settings.bbox_margin_deg);
    let outcome = client.fetch_states(bbox).await;

    let mut engine = ProximityEngine::new(LogActuator::new(), ClipBank::synthesized(1000), 1);
    let report = engine.complete_scan(outcome, &settings, Utc::now());

    println!("{}", serde_json::to_string_pretty(&report.summary)?);
    eprintln!(
        "Alarm level {} ({} received, {} without position)",
        report.level, report.received, report.dropped
    );

    if !report.status.is_success() {
        bail!(
            "scan failed: {}",
            report.summary.detail.as_deref().unwrap_or("no detail")
        );
    }
    Ok(())
}
