//! Adaptive flight scan loop.
//!
//! Sleeps for the interval chosen by the scheduler, fetches the aircraft in
//! the query box, applies the result to the engine and re-arms. Scans run to
//! completion; shutdown is only honored while idle.

use std::sync::Arc;
use std::time::Duration;

use alarm_core::{BoundingBox, DataSource, ScanReport, ScanScheduler};
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::state::AppState;

/// Start the scan loop.
pub async fn run_scan_loop<S: DataSource>(
    state: Arc<AppState>,
    source: S,
    initial_delay: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut scheduler = ScanScheduler::new(initial_delay);
    tracing::info!(
        "Initial flight scan scheduled in {} seconds",
        initial_delay.as_secs()
    );

    loop {
        let wait = scheduler.next_in().unwrap_or(Duration::from_secs(1));
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Scan loop shutting down");
                break;
            }
            _ = sleep(wait) => {}
        }

        let (_, next) = match run_scan_cycle(&state, &source, &mut scheduler).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!("Scan skipped: {}", err);
                continue;
            }
        };
        tracing::debug!("Next scan scheduled in {} seconds", next.as_secs());
    }
}

/// Run exactly one scan and re-arm the scheduler.
///
/// Returns the report and the delay until the next scan.
pub async fn run_scan_cycle<S: DataSource>(
    state: &AppState,
    source: &S,
    scheduler: &mut ScanScheduler,
) -> Result<(ScanReport, Duration), alarm_core::SchedulerError> {
    scheduler.begin_scan()?;

    // Settings are re-read every cycle so edits apply without a restart.
    let settings = state.settings().current();
    let bbox = BoundingBox::around(settings.center(), settings.bbox_margin_deg);
    tracing::debug!(
        "Scanning box lat {:.3}..{:.3} lon {:.3}..{:.3}",
        bbox.lat_min,
        bbox.lat_max,
        bbox.lon_min,
        bbox.lon_max
    );

    let outcome = source.fetch_states(bbox).await;
    let report = state.apply_scan(outcome, &settings);
    log_report(&report);

    let next = scheduler.finish_scan(report.level, &settings);
    Ok((report, next))
}

fn log_report(report: &ScanReport) {
    let summary = &report.summary;
    if report.status.is_success() {
        tracing::info!(
            "Flights detected: L1: {}, L2: {}, L3: {}, Total: {} ({} in box, {} without position)",
            summary.counts.level1,
            summary.counts.level2,
            summary.counts.level3,
            summary.total,
            report.received,
            report.dropped
        );
    } else {
        tracing::warn!(
            "Scan failed ({:?}): {}; keeping alarm level {}",
            report.status,
            summary.detail.as_deref().unwrap_or("no detail"),
            report.level
        );
    }

    if let Some(transition) = report.transition {
        tracing::info!(
            "Alarm level {} -> {} (indicator {}, sound {})",
            transition.from,
            transition.to,
            if transition.indicator_on { "on" } else { "off" },
            if transition.sound_started { "playing" } else { "silent" }
        );
    }
}
