use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alarm_core::{
    ActuatorPort, AudioState, BoundingBox, ClipBank, DataSource, FetchError, ProximityEngine,
    ProximityTier, RawAircraft, ScanScheduler, ScanStatus, SILENCE,
};
use alarm_server::loops::audio_loop::run_audio_loop;
use alarm_server::loops::scan_loop::{run_scan_cycle, run_scan_loop};
use alarm_server::persistence::SettingsStore;
use alarm_server::state::AppState;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortEvent {
    Indicator(bool),
    Sample(u8),
}

#[derive(Clone, Default)]
struct RecordingPort {
    events: Arc<Mutex<Vec<PortEvent>>>,
}

impl RecordingPort {
    fn events(&self) -> Vec<PortEvent> {
        self.events.lock().unwrap().clone()
    }

    fn indicator_events(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PortEvent::Indicator(on) => Some(on),
                PortEvent::Sample(_) => None,
            })
            .collect()
    }

    fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl ActuatorPort for RecordingPort {
    fn set_indicator(&mut self, on: bool) {
        self.events.lock().unwrap().push(PortEvent::Indicator(on));
    }

    fn emit_sample(&mut self, sample: u8) {
        self.events.lock().unwrap().push(PortEvent::Sample(sample));
    }
}

/// Replays canned fetch outcomes; an empty sky once the script runs out.
#[derive(Default)]
struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<RawAircraft>, FetchError>>>,
    calls: AtomicUsize,
    last_bbox: Mutex<Option<BoundingBox>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Vec<RawAircraft>, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DataSource for ScriptedSource {
    async fn fetch_states(&self, bbox: BoundingBox) -> Result<Vec<RawAircraft>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_bbox.lock().unwrap() = Some(bbox);
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }
}

/// Lets a test keep a handle on a source the scan loop owns.
struct SharedSource(Arc<ScriptedSource>);

impl DataSource for SharedSource {
    async fn fetch_states(&self, bbox: BoundingBox) -> Result<Vec<RawAircraft>, FetchError> {
        self.0.fetch_states(bbox).await
    }
}

/// An aircraft due north of the default center at `km`.
fn aircraft_at(icao24: &str, km: f64) -> RawAircraft {
    RawAircraft {
        icao24: icao24.to_string(),
        callsign: Some(format!("{}  ", icao24.to_uppercase())),
        latitude: Some(15.3582 + km / 111.195),
        longitude: Some(75.0210),
        ..Default::default()
    }
}

async fn setup() -> (Arc<AppState>, RecordingPort) {
    let path = std::env::temp_dir()
        .join(format!("flight-alarm-loop-{}", uuid::Uuid::new_v4()))
        .join("settings.json");
    let (settings, _) = SettingsStore::load(&path).await.expect("load settings");

    let port = RecordingPort::default();
    let engine = ProximityEngine::new(
        Box::new(port.clone()) as alarm_server::state::BoxedPort,
        ClipBank::synthesized(1000),
        10,
    );
    (Arc::new(AppState::new(engine, settings)), port)
}

#[tokio::test]
async fn scan_cycle_queries_box_around_center() {
    let (state, _port) = setup().await;
    let source = ScriptedSource::new(vec![Ok(Vec::new())]);
    let mut scheduler = ScanScheduler::new(Duration::ZERO);

    run_scan_cycle(&state, &source, &mut scheduler)
        .await
        .expect("scan");

    let bbox = source.last_bbox.lock().unwrap().expect("bbox");
    assert!((bbox.lat_min - 14.3582).abs() < 1e-9);
    assert!((bbox.lat_max - 16.3582).abs() < 1e-9);
    assert!((bbox.lon_min - 74.0210).abs() < 1e-9);
    assert!((bbox.lon_max - 76.0210).abs() < 1e-9);
    assert_eq!(scheduler.completed_scans(), 1);
}

#[tokio::test]
async fn interval_adapts_to_aircraft_presence() {
    let (state, _port) = setup().await;
    let source = ScriptedSource::new(vec![
        Ok(vec![aircraft_at("abc123", 40.0)]),
        Ok(Vec::new()),
    ]);
    let mut scheduler = ScanScheduler::new(Duration::ZERO);

    let (report, next) = run_scan_cycle(&state, &source, &mut scheduler)
        .await
        .expect("scan");
    assert_eq!(report.level, ProximityTier::Warning);
    assert_eq!(next, Duration::from_secs(10));

    let (report, next) = run_scan_cycle(&state, &source, &mut scheduler)
        .await
        .expect("scan");
    assert_eq!(report.level, ProximityTier::None);
    assert_eq!(next, Duration::from_secs(60));
}

#[tokio::test]
async fn failed_scan_keeps_alarm_and_aircraft() {
    let (state, port) = setup().await;
    let source = ScriptedSource::new(vec![
        Ok(vec![aircraft_at("abc123", 20.0), aircraft_at("def456", 65.0)]),
        Err(FetchError::Network("connection refused".into())),
    ]);
    let mut scheduler = ScanScheduler::new(Duration::ZERO);

    run_scan_cycle(&state, &source, &mut scheduler)
        .await
        .expect("scan");
    assert_eq!(state.current_alarm_level(), ProximityTier::Detection);
    let before = state.current_aircraft();
    port.clear();

    let (report, next) = run_scan_cycle(&state, &source, &mut scheduler)
        .await
        .expect("scan");

    assert_eq!(report.status, ScanStatus::NetworkError);
    assert_eq!(state.current_alarm_level(), ProximityTier::Detection);
    assert_eq!(state.current_aircraft(), before);
    assert!(port.indicator_events().is_empty());
    // Level is still active, so the fast interval applies.
    assert_eq!(next, Duration::from_secs(10));

    let history = state.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, ScanStatus::NetworkError);
    assert_eq!(history[0].total, 0);
    assert!(history[0].observations.is_empty());
    assert_eq!(history[1].total, 2);
}

#[tokio::test]
async fn repeated_level_does_not_re_actuate() {
    let (state, port) = setup().await;
    let source = ScriptedSource::new(vec![
        Ok(vec![aircraft_at("abc123", 40.0)]),
        Ok(vec![aircraft_at("abc123", 45.0)]),
    ]);
    let mut scheduler = ScanScheduler::new(Duration::ZERO);

    let (first, _) = run_scan_cycle(&state, &source, &mut scheduler)
        .await
        .expect("scan");
    assert!(first.transition.is_some());
    assert_eq!(port.indicator_events(), vec![true]);
    port.clear();

    let (second, _) = run_scan_cycle(&state, &source, &mut scheduler)
        .await
        .expect("scan");

    assert!(second.transition.is_none());
    assert!(port.events().is_empty());
    assert_eq!(state.current_aircraft().len(), 1);
}

#[tokio::test]
async fn higher_level_preempts_playing_clip() {
    let (state, port) = setup().await;
    let source = ScriptedSource::new(vec![
        Ok(vec![aircraft_at("abc123", 20.0)]),
        Ok(vec![aircraft_at("abc123", 20.0), aircraft_at("def456", 40.0)]),
    ]);
    let mut scheduler = ScanScheduler::new(Duration::ZERO);

    run_scan_cycle(&state, &source, &mut scheduler)
        .await
        .expect("scan");
    for _ in 0..10 {
        state.tick_audio();
    }
    assert!(state.audio_playing());
    port.clear();

    let (report, _) = run_scan_cycle(&state, &source, &mut scheduler)
        .await
        .expect("scan");

    let transition = report.transition.expect("transition");
    assert_eq!(transition.from, ProximityTier::Alarm);
    assert_eq!(transition.to, ProximityTier::Warning);
    assert!(transition.sound_started);
    // Indicator first, then the old clip is silenced before the new one starts.
    assert_eq!(
        port.events(),
        vec![PortEvent::Indicator(true), PortEvent::Sample(SILENCE)]
    );
    assert_eq!(state.alarm_status().audio, AudioState::Playing);
}

#[tokio::test]
async fn muted_alarm_lights_indicator_only() {
    let (state, port) = setup().await;
    let mut settings = state.settings().current();
    settings.sound_warning = false;
    state.settings().update(settings).await.expect("update");
    let source = ScriptedSource::new(vec![Ok(vec![aircraft_at("abc123", 10.0)])]);
    let mut scheduler = ScanScheduler::new(Duration::ZERO);

    let (report, _) = run_scan_cycle(&state, &source, &mut scheduler)
        .await
        .expect("scan");

    assert!(!report.transition.expect("transition").sound_started);
    assert!(!state.audio_playing());
    assert_eq!(port.indicator_events(), vec![true]);
}

#[tokio::test(start_paused = true)]
async fn scan_loop_follows_schedule_and_stops() {
    let (state, _port) = setup().await;
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(Vec::new()),
        Ok(vec![aircraft_at("abc123", 40.0)]),
    ]));
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let handle = tokio::spawn(run_scan_loop(
        state.clone(),
        SharedSource(source.clone()),
        Duration::from_secs(5),
        shutdown_rx,
    ));

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(source.calls(), 0);

    // First scan at 5 s finds nothing, so the next comes 60 s later.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.calls(), 1);
    tokio::time::sleep(Duration::from_secs(58)).await;
    assert_eq!(source.calls(), 1);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.calls(), 2);
    assert_eq!(state.current_alarm_level(), ProximityTier::Warning);

    // Aircraft present: 10 s cadence.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(source.calls(), 3);
    assert_eq!(state.current_alarm_level(), ProximityTier::None);

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn audio_loop_plays_clip_to_completion() {
    let (state, port) = setup().await;
    let settings = state.settings().current();
    state.apply_scan(Ok(vec![aircraft_at("abc123", 40.0)]), &settings);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let handle = tokio::spawn(run_audio_loop(
        state.clone(),
        Duration::from_millis(1),
        shutdown_rx,
    ));

    // The level 2 clip is 1200 samples at 1 kHz.
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert!(!state.audio_playing());
    let samples: Vec<u8> = port
        .events()
        .into_iter()
        .filter_map(|e| match e {
            PortEvent::Sample(s) => Some(s),
            PortEvent::Indicator(_) => None,
        })
        .collect();
    assert!(samples.len() >= 1200);
    assert_eq!(samples.last(), Some(&SILENCE));

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();
}
