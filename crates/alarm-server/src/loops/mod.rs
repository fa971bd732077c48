//! Background loops for continuous processing.

pub mod audio_loop;
pub mod scan_loop;

use tokio::task::JoinHandle;

/// Wait for a loop task to exit. A panicked or cancelled task is logged and
/// reported as `false`.
pub async fn await_loop(name: &str, handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => {
            tracing::debug!("{} loop exited", name);
            true
        }
        Err(err) if err.is_panic() => {
            tracing::error!("{} loop panicked: {}", name, err);
            false
        }
        Err(err) => {
            tracing::error!("{} loop did not finish: {}", name, err);
            false
        }
    }
}
