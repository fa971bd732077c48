//! The proximity alarm engine.
//!
//! Owns every piece of mutable device state: the alarm level, the aircraft
//! seen by the last successful scan, the scan history and the audio player.
//! Only [`ProximityEngine::complete_scan`] changes the level, the aircraft set
//! and the history. Hosts that drive scans and audio ticks from different
//! threads wrap the engine in a mutex.

use chrono::{DateTime, Utc};

use crate::actuator::ActuatorPort;
use crate::alarm::{AlarmState, Transition};
use crate::audio::{AudioActuator, AudioState, ClipBank, TickOutcome};
use crate::history::HistoryLog;
use crate::models::{AircraftObservation, AlarmLevel, RawAircraft, ScanStatus, ScanSummary};
use crate::settings::AlarmSettings;
use crate::source::FetchError;

/// What one completed scan did.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub status: ScanStatus,
    /// Alarm level after the scan was applied
    pub level: AlarmLevel,
    pub transition: Option<Transition>,
    pub summary: ScanSummary,
    /// Records returned by the source
    pub received: usize,
    /// Records dropped for missing coordinates
    pub dropped: usize,
}

pub struct ProximityEngine<P> {
    alarm: AlarmState,
    aircraft: Vec<AircraftObservation>,
    history: HistoryLog,
    audio: AudioActuator,
    port: P,
}

impl<P: ActuatorPort> ProximityEngine<P> {
    pub fn new(port: P, clips: ClipBank, history_capacity: usize) -> Self {
        Self {
            alarm: AlarmState::new(),
            aircraft: Vec::new(),
            history: HistoryLog::new(history_capacity),
            audio: AudioActuator::new(clips),
            port,
        }
    }

    /// Apply the outcome of one fetch.
    ///
    /// A failed fetch is recorded in history and changes nothing else. A
    /// successful one replaces the aircraft set and moves the alarm level to
    /// the highest tier present.
    pub fn complete_scan(
        &mut self,
        outcome: Result<Vec<RawAircraft>, FetchError>,
        settings: &AlarmSettings,
        now: DateTime<Utc>,
    ) -> ScanReport {
        // History timestamps never go backwards, even if the wall clock does.
        let timestamp = match self.history.latest() {
            Some(latest) if latest.timestamp > now => latest.timestamp,
            _ => now,
        };

        let raw = match outcome {
            Ok(raw) => raw,
            Err(err) => {
                let summary = ScanSummary::failure(timestamp, err.status(), Some(err.to_string()));
                self.history.append(summary.clone());
                return ScanReport {
                    status: summary.status,
                    level: self.alarm.level(),
                    transition: None,
                    summary,
                    received: 0,
                    dropped: 0,
                };
            }
        };

        let center = settings.center();
        let radii = settings.radii();
        let classified: Vec<AircraftObservation> = raw
            .iter()
            .filter_map(|record| AircraftObservation::classify(record, center, &radii))
            .collect();
        let dropped = raw.len() - classified.len();

        let in_range: Vec<AircraftObservation> = classified
            .into_iter()
            .filter(|obs| obs.proximity_level.is_active())
            .collect();

        let new_level = in_range
            .iter()
            .map(|obs| obs.proximity_level)
            .max()
            .unwrap_or_default();

        let transition = self.alarm.transition(
            new_level,
            settings.sound_warning,
            &mut self.audio,
            &mut self.port,
        );

        let summary = ScanSummary::success(timestamp, in_range.clone());
        self.aircraft = in_range;
        self.history.append(summary.clone());

        ScanReport {
            status: ScanStatus::Success,
            level: self.alarm.level(),
            transition,
            summary,
            received: raw.len(),
            dropped,
        }
    }

    /// Advance audio playback by one sample.
    pub fn tick_audio(&mut self) -> TickOutcome {
        self.audio.tick(&mut self.port)
    }

    pub fn stop_audio(&mut self) {
        self.audio.stop(&mut self.port);
    }

    pub fn current_aircraft(&self) -> Vec<AircraftObservation> {
        self.aircraft.clone()
    }

    pub fn history(&self) -> Vec<ScanSummary> {
        self.history.entries()
    }

    pub fn current_alarm_level(&self) -> AlarmLevel {
        self.alarm.level()
    }

    pub fn indicator_on(&self) -> bool {
        self.alarm.level().is_active()
    }

    pub fn audio_state(&self) -> AudioState {
        self.audio.state()
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}
