//! Sample-at-a-time alarm clip playback.
//!
//! The actuator owns no timer. A host task calls [`AudioActuator::tick`] at a
//! fixed rate while a clip is playing and stops ticking once a tick reports
//! [`TickOutcome::Finished`].

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use crate::actuator::{ActuatorPort, SILENCE};
use crate::models::AlarmLevel;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipError {
    #[error("alarm clip for level {0} is empty")]
    Empty(u8),
}

/// One unsigned 8-bit PCM clip per active alarm level.
#[derive(Debug, Clone)]
pub struct ClipBank {
    clips: [Vec<u8>; 3],
}

impl ClipBank {
    /// Clips are given for levels 1, 2 and 3, in that order.
    pub fn new(clips: [Vec<u8>; 3]) -> Result<Self, ClipError> {
        for (idx, clip) in clips.iter().enumerate() {
            if clip.is_empty() {
                return Err(ClipError::Empty(idx as u8 + 1));
            }
        }
        Ok(Self { clips })
    }

    /// Generate three distinguishable tone patterns for a playback rate.
    ///
    /// Level 1 is a burst of short high beeps, level 2 alternates two
    /// mid tones, level 3 is a single rising chirp.
    pub fn synthesized(sample_rate_hz: u32) -> Self {
        let rate = f64::from(sample_rate_hz.max(100));

        let mut level1 = Vec::new();
        for _ in 0..4 {
            level1.extend(tone(rate, rate / 6.0, 0.12, 0.9));
            level1.extend(silence(rate, 0.08));
        }

        let mut level2 = Vec::new();
        for _ in 0..3 {
            level2.extend(tone(rate, rate / 8.0, 0.2, 0.8));
            level2.extend(tone(rate, rate / 11.0, 0.2, 0.8));
        }

        let level3 = chirp(rate, rate / 24.0, rate / 10.0, 0.5, 0.7);

        Self {
            clips: [level1, level2, level3],
        }
    }

    pub fn clip(&self, level: AlarmLevel) -> Option<&[u8]> {
        match level.as_u8() {
            n @ 1..=3 => self.clips.get(usize::from(n) - 1).map(Vec::as_slice),
            _ => None,
        }
    }
}

fn to_sample(value: f64, amplitude: f64) -> u8 {
    (f64::from(SILENCE) + 127.0 * amplitude * value).round().clamp(0.0, 255.0) as u8
}

fn tone(rate: f64, freq: f64, secs: f64, amplitude: f64) -> Vec<u8> {
    let count = (rate * secs).round() as usize;
    (0..count)
        .map(|n| to_sample((TAU * freq * n as f64 / rate).sin(), amplitude))
        .collect()
}

fn silence(rate: f64, secs: f64) -> Vec<u8> {
    vec![SILENCE; (rate * secs).round() as usize]
}

fn chirp(rate: f64, start_freq: f64, end_freq: f64, secs: f64, amplitude: f64) -> Vec<u8> {
    let count = (rate * secs).round() as usize;
    let sweep = (end_freq - start_freq) / secs;
    (0..count)
        .map(|n| {
            let t = n as f64 / rate;
            let phase = TAU * (start_freq * t + 0.5 * sweep * t * t);
            to_sample(phase.sin(), amplitude)
        })
        .collect()
}

/// Externally visible playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioState {
    Stopped,
    Playing,
}

#[derive(Debug, Clone, Copy)]
enum Playback {
    Stopped,
    Playing {
        level: AlarmLevel,
        cursor: usize,
        started_at: Instant,
    },
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing is playing; the tick source can be released.
    Idle,
    /// A sample was written to the port.
    Emitted,
    /// The clip ran out; silence was written and playback stopped.
    Finished(PlaybackStats),
}

/// Timing of a clip that played to the end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStats {
    pub level: AlarmLevel,
    pub samples: usize,
    pub elapsed: Duration,
}

impl PlaybackStats {
    /// Samples per second actually delivered, as opposed to the tick rate
    /// that was asked for.
    pub fn achieved_rate_hz(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.samples as f64 / secs
    }
}

/// Stopped/Playing state machine over a [`ClipBank`].
#[derive(Debug)]
pub struct AudioActuator {
    clips: ClipBank,
    playback: Playback,
}

impl AudioActuator {
    pub fn new(clips: ClipBank) -> Self {
        Self {
            clips,
            playback: Playback::Stopped,
        }
    }

    pub fn state(&self) -> AudioState {
        match self.playback {
            Playback::Stopped => AudioState::Stopped,
            Playback::Playing { .. } => AudioState::Playing,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.playback, Playback::Playing { .. })
    }

    /// Start the clip for `level` from its first sample.
    ///
    /// Whatever was playing is cut off first. A level without a clip only
    /// silences the output. Returns whether a clip is now playing.
    pub fn play(&mut self, level: AlarmLevel, port: &mut dyn ActuatorPort) -> bool {
        self.stop(port);

        if self.clips.clip(level).is_none() {
            return false;
        }

        self.playback = Playback::Playing {
            level,
            cursor: 0,
            started_at: Instant::now(),
        };
        true
    }

    /// Stop immediately and silence the output. Safe to call in any state.
    pub fn stop(&mut self, port: &mut dyn ActuatorPort) {
        self.playback = Playback::Stopped;
        port.emit_sample(SILENCE);
    }

    pub fn tick(&mut self, port: &mut dyn ActuatorPort) -> TickOutcome {
        let Playback::Playing {
            level,
            cursor,
            started_at,
        } = self.playback
        else {
            return TickOutcome::Idle;
        };

        let clip = self.clips.clip(level).unwrap_or(&[]);
        if let Some(&sample) = clip.get(cursor) {
            port.emit_sample(sample);
            self.playback = Playback::Playing {
                level,
                cursor: cursor + 1,
                started_at,
            };
            return TickOutcome::Emitted;
        }

        port.emit_sample(SILENCE);
        self.playback = Playback::Stopped;
        TickOutcome::Finished(PlaybackStats {
            level,
            samples: cursor,
            elapsed: started_at.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProximityTier;

    #[derive(Default)]
    struct Recorder {
        samples: Vec<u8>,
    }

    impl ActuatorPort for Recorder {
        fn set_indicator(&mut self, _on: bool) {}

        fn emit_sample(&mut self, sample: u8) {
            self.samples.push(sample);
        }
    }

    fn bank() -> ClipBank {
        ClipBank::new([vec![10, 11, 12, 13], vec![20, 21, 22], vec![30]]).unwrap()
    }

    #[test]
    fn plays_clip_then_finishes_with_silence() {
        let mut audio = AudioActuator::new(bank());
        let mut port = Recorder::default();

        assert!(audio.play(ProximityTier::Warning, &mut port));
        assert_eq!(audio.state(), AudioState::Playing);

        let mut outcomes = Vec::new();
        for _ in 0..4 {
            outcomes.push(audio.tick(&mut port));
        }

        assert_eq!(port.samples, vec![SILENCE, 20, 21, 22, SILENCE]);
        assert!(matches!(
            outcomes[3],
            TickOutcome::Finished(PlaybackStats { samples: 3, .. })
        ));
        assert_eq!(audio.state(), AudioState::Stopped);
        assert_eq!(audio.tick(&mut port), TickOutcome::Idle);
    }

    #[test]
    fn replay_restarts_from_first_sample_of_new_clip() {
        let mut audio = AudioActuator::new(bank());
        let mut port = Recorder::default();

        audio.play(ProximityTier::Alarm, &mut port);
        audio.tick(&mut port);
        audio.tick(&mut port);
        audio.play(ProximityTier::Warning, &mut port);
        while audio.tick(&mut port) == TickOutcome::Emitted {}

        // Clip 1 was cut after two samples; 12 and 13 never appear.
        assert_eq!(port.samples, vec![SILENCE, 10, 11, SILENCE, 20, 21, 22, SILENCE]);
    }

    #[test]
    fn stop_is_immediate_and_idempotent() {
        let mut audio = AudioActuator::new(bank());
        let mut port = Recorder::default();

        audio.play(ProximityTier::Alarm, &mut port);
        audio.tick(&mut port);
        audio.stop(&mut port);
        audio.stop(&mut port);

        assert!(!audio.is_playing());
        assert_eq!(audio.tick(&mut port), TickOutcome::Idle);
        assert_eq!(port.samples, vec![SILENCE, 10, SILENCE, SILENCE]);
    }

    #[test]
    fn level_zero_only_silences() {
        let mut audio = AudioActuator::new(bank());
        let mut port = Recorder::default();

        audio.play(ProximityTier::Alarm, &mut port);
        assert!(!audio.play(ProximityTier::None, &mut port));
        assert_eq!(audio.state(), AudioState::Stopped);
        assert_eq!(port.samples.last(), Some(&SILENCE));
    }

    #[test]
    fn empty_clip_is_rejected() {
        let err = ClipBank::new([vec![1], Vec::new(), vec![3]]).unwrap_err();
        assert_eq!(err, ClipError::Empty(2));
    }

    #[test]
    fn synthesized_clips_differ_per_level() {
        let bank = ClipBank::synthesized(1000);
        let l1 = bank.clip(ProximityTier::Alarm).unwrap();
        let l2 = bank.clip(ProximityTier::Warning).unwrap();
        let l3 = bank.clip(ProximityTier::Detection).unwrap();
        assert_eq!(l1.len(), 800);
        assert_eq!(l2.len(), 1200);
        assert_eq!(l3.len(), 500);
        assert_ne!(&l1[..50], &l2[..50]);
        assert!(bank.clip(ProximityTier::None).is_none());
    }

    #[test]
    fn achieved_rate_uses_elapsed_time() {
        let stats = PlaybackStats {
            level: ProximityTier::Alarm,
            samples: 500,
            elapsed: Duration::from_millis(250),
        };
        assert!((stats.achieved_rate_hz() - 2000.0).abs() < 1e-9);
    }
}
