//! Device-wide alarm level and its edge-triggered actuation.

use crate::actuator::ActuatorPort;
use crate::audio::AudioActuator;
use crate::models::AlarmLevel;

/// What a level change did to the actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: AlarmLevel,
    pub to: AlarmLevel,
    pub indicator_on: bool,
    pub sound_started: bool,
}

/// Holds the current alarm level.
///
/// Actuators are only touched when the level changes, so re-detecting the
/// same aircraft on every scan never restarts the clip.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlarmState {
    level: AlarmLevel,
}

impl AlarmState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> AlarmLevel {
        self.level
    }

    /// Move to `new_level`, driving the indicator first and the audio second.
    ///
    /// The indicator is binary: on for any active level. With sound disabled
    /// the audio is stopped instead of played. Returns `None` when the level
    /// did not change.
    pub fn transition(
        &mut self,
        new_level: AlarmLevel,
        sound_enabled: bool,
        audio: &mut AudioActuator,
        port: &mut dyn ActuatorPort,
    ) -> Option<Transition> {
        if new_level == self.level {
            return None;
        }

        let from = self.level;
        self.level = new_level;

        let indicator_on = new_level.is_active();
        port.set_indicator(indicator_on);

        let sound_started = if sound_enabled {
            audio.play(new_level, port)
        } else {
            audio.stop(port);
            false
        };

        Some(Transition {
            from,
            to: new_level,
            indicator_on,
            sound_started,
        })
    }
}
