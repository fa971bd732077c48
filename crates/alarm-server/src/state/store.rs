//! Shared application state.

use std::sync::{Mutex, MutexGuard};

use alarm_core::{
    ActuatorPort, AircraftObservation, AlarmLevel, AlarmSettings, AudioState, FetchError,
    ProximityEngine, RawAircraft, ScanReport, ScanSummary, TickOutcome,
};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Notify;

use crate::persistence::SettingsStore;

pub type BoxedPort = Box<dyn ActuatorPort>;

/// Snapshot of the actuator-facing state.
#[derive(Debug, Clone, Serialize)]
pub struct AlarmStatus {
    pub level: AlarmLevel,
    pub indicator: bool,
    pub audio: AudioState,
}

/// Application state shared by the scan loop, the audio loop and the API.
///
/// The engine sits behind a std mutex because the two loops may run on
/// different runtime threads. The lock is never held across an await.
pub struct AppState {
    engine: Mutex<ProximityEngine<BoxedPort>>,
    settings: SettingsStore,
    audio_wake: Notify,
}

impl AppState {
    pub fn new(engine: ProximityEngine<BoxedPort>, settings: SettingsStore) -> Self {
        Self {
            engine: Mutex::new(engine),
            settings,
            audio_wake: Notify::new(),
        }
    }

    fn engine(&self) -> MutexGuard<'_, ProximityEngine<BoxedPort>> {
        self.engine
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Apply a fetch outcome and wake the audio loop if a clip started.
    pub fn apply_scan(
        &self,
        outcome: Result<Vec<RawAircraft>, FetchError>,
        settings: &AlarmSettings,
    ) -> ScanReport {
        let report = self.engine().complete_scan(outcome, settings, Utc::now());
        if report.transition.is_some_and(|t| t.sound_started) {
            self.audio_wake.notify_one();
        }
        report
    }

    pub fn tick_audio(&self) -> TickOutcome {
        self.engine().tick_audio()
    }

    pub fn stop_audio(&self) {
        self.engine().stop_audio();
    }

    pub fn audio_playing(&self) -> bool {
        self.engine().audio_state() == AudioState::Playing
    }

    /// Resolves once a clip has been started.
    pub async fn audio_started(&self) {
        self.audio_wake.notified().await;
    }

    pub fn current_aircraft(&self) -> Vec<AircraftObservation> {
        self.engine().current_aircraft()
    }

    pub fn history(&self) -> Vec<ScanSummary> {
        self.engine().history()
    }

    pub fn current_alarm_level(&self) -> AlarmLevel {
        self.engine().current_alarm_level()
    }

    pub fn alarm_status(&self) -> AlarmStatus {
        let engine = self.engine();
        AlarmStatus {
            level: engine.current_alarm_level(),
            indicator: engine.indicator_on(),
            audio: engine.audio_state(),
        }
    }
}
