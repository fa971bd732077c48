//! Audio tick loop.
//!
//! Parks until a clip starts, then ticks the engine at a fixed period until
//! the clip finishes or is stopped. The requested period is an upper bound on
//! quality: tokio timers have millisecond granularity, so anything below 1 ms
//! degrades to roughly 1 kHz. The rate actually achieved is logged per clip.

use std::sync::Arc;
use std::time::Duration;

use alarm_core::TickOutcome;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};

use crate::state::AppState;

/// Start the audio loop.
pub async fn run_audio_loop(
    state: Arc<AppState>,
    tick: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let requested_hz = 1.0 / tick.as_secs_f64().max(1e-6);

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            _ = state.audio_started() => {}
        }

        if !state.audio_playing() {
            continue;
        }

        let mut ticker = interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    state.stop_audio();
                    tracing::info!("Audio loop shutting down");
                    return;
                }
                _ = ticker.tick() => {}
            }

            match state.tick_audio() {
                TickOutcome::Emitted => {}
                TickOutcome::Finished(stats) => {
                    tracing::info!(
                        "Level {} clip finished: {} samples in {} ms (~{:.0} Hz achieved, {:.0} Hz requested)",
                        stats.level,
                        stats.samples,
                        stats.elapsed.as_millis(),
                        stats.achieved_rate_hz(),
                        requested_hz
                    );
                    break;
                }
                TickOutcome::Idle => break,
            }
        }
    }

    state.stop_audio();
    tracing::info!("Audio loop shutting down");
}
