//! Flight alarm server - scans for nearby aircraft and drives the alarm outputs.

use std::net::SocketAddr;
use std::sync::Arc;

use alarm_core::ProximityEngine;
use alarm_opensky::OpenSkyClient;
use alarm_server::actuators::{LogActuator, PcmSink};
use alarm_server::config::Config;
use alarm_server::persistence::SettingsStore;
use alarm_server::state::{AppState, BoxedPort};
use alarm_server::{api, clips, loops};
use anyhow::Result;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("alarm_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting flight alarm server...");

    let config = Config::from_env();

    let (settings, warnings) = SettingsStore::load(&config.settings_path).await?;
    for warning in &warnings {
        tracing::warn!("Settings warning: {}", warning);
    }
    let current = settings.current();
    tracing::info!(
        "Watching {:.4}, {:.4} with radii {}/{}/{} km",
        current.latitude,
        current.longitude,
        current.radius_level1,
        current.radius_level2,
        current.radius_level3
    );

    let clip_bank = clips::load_clip_bank(config.clip_dir.as_deref(), config.audio_rate_hz())?;
    let port: BoxedPort = match &config.pcm_sink {
        Some(path) => Box::new(PcmSink::open(path)?),
        None => Box::new(LogActuator::new()),
    };
    let engine = ProximityEngine::new(port, clip_bank, config.history_capacity);
    let state = Arc::new(AppState::new(engine, settings));

    let source = OpenSkyClient::new(config.opensky_url.clone(), config.opensky_timeout())?
        .with_credentials(config.opensky_credentials());
    tracing::info!("Using aircraft source {}", source.base_url());

    // Start background loops
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let scan_task = tokio::spawn(loops::scan_loop::run_scan_loop(
        state.clone(),
        source,
        config.initial_scan_delay(),
        shutdown_tx.subscribe(),
    ));
    let audio_task = tokio::spawn(loops::audio_loop::run_audio_loop(
        state.clone(),
        config.audio_tick(),
        shutdown_tx.subscribe(),
    ));

    // Build the app
    let app = api::routes()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if shutdown_tx.send(()).is_err() {
        tracing::warn!("Background loops had already exited before shutdown");
    }
    let (scan_ok, audio_ok) = tokio::join!(
        loops::await_loop("Scan", scan_task),
        loops::await_loop("Audio", audio_task)
    );
    if scan_ok && audio_ok {
        tracing::info!("Flight alarm server stopped");
    } else {
        tracing::warn!("Flight alarm server stopped with failed background loops");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
