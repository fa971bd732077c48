//! Adaptive scan scheduling.

use std::time::Duration;

use thiserror::Error;

use crate::models::AlarmLevel;
use crate::settings::AlarmSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("a scan is already in progress")]
    AlreadyScanning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Timer armed; the next scan is due after `next_in`
    Idle { next_in: Duration },
    /// Fetch and classification in progress
    Scanning,
}

/// Two-state scan scheduler.
///
/// A scan cannot start while one is running. Finishing a scan always returns
/// to Idle with a fresh interval, whatever the scan's outcome: there is no
/// retry or backoff beyond the next regular slot.
#[derive(Debug, Clone)]
pub struct ScanScheduler {
    state: SchedulerState,
    completed: u64,
}

impl ScanScheduler {
    pub fn new(initial_delay: Duration) -> Self {
        Self {
            state: SchedulerState::Idle {
                next_in: initial_delay,
            },
            completed: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Delay before the next scan, or `None` while scanning.
    pub fn next_in(&self) -> Option<Duration> {
        match self.state {
            SchedulerState::Idle { next_in } => Some(next_in),
            SchedulerState::Scanning => None,
        }
    }

    pub fn completed_scans(&self) -> u64 {
        self.completed
    }

    pub fn begin_scan(&mut self) -> Result<(), SchedulerError> {
        match self.state {
            SchedulerState::Scanning => Err(SchedulerError::AlreadyScanning),
            SchedulerState::Idle { .. } => {
                self.state = SchedulerState::Scanning;
                Ok(())
            }
        }
    }

    /// Re-arm after a scan. `level` is the alarm level once the scan has been
    /// applied, which for a failed scan is the unchanged previous level.
    pub fn finish_scan(&mut self, level: AlarmLevel, settings: &AlarmSettings) -> Duration {
        let next_in = Self::interval_for(level, settings);
        self.state = SchedulerState::Idle { next_in };
        self.completed += 1;
        next_in
    }

    /// Scan faster while anything is in range, slower otherwise.
    pub fn interval_for(level: AlarmLevel, settings: &AlarmSettings) -> Duration {
        if level.is_active() {
            settings.present_interval()
        } else {
            settings.idle_interval()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProximityTier;

    fn settings() -> AlarmSettings {
        AlarmSettings {
            no_flight_scan_freq: 60,
            flight_present_scan_freq: 10,
            ..Default::default()
        }
    }

    #[test]
    fn starts_idle_with_initial_delay() {
        let scheduler = ScanScheduler::new(Duration::from_secs(5));
        assert_eq!(scheduler.next_in(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn scan_is_not_reentrant() {
        let mut scheduler = ScanScheduler::new(Duration::ZERO);
        scheduler.begin_scan().expect("first scan starts");
        assert_eq!(scheduler.begin_scan(), Err(SchedulerError::AlreadyScanning));
        assert_eq!(scheduler.state(), SchedulerState::Scanning);
        assert_eq!(scheduler.next_in(), None);
    }

    #[test]
    fn aircraft_present_uses_present_interval() {
        let mut scheduler = ScanScheduler::new(Duration::ZERO);
        scheduler.begin_scan().unwrap();
        let next = scheduler.finish_scan(ProximityTier::Detection, &settings());
        assert_eq!(next, Duration::from_secs(10));
        assert_eq!(
            scheduler.state(),
            SchedulerState::Idle {
                next_in: Duration::from_secs(10)
            }
        );
    }

    #[test]
    fn clear_sky_uses_idle_interval() {
        let mut scheduler = ScanScheduler::new(Duration::ZERO);
        scheduler.begin_scan().unwrap();
        let next = scheduler.finish_scan(ProximityTier::None, &settings());
        assert_eq!(next, Duration::from_secs(60));
        assert_eq!(scheduler.completed_scans(), 1);
        scheduler.begin_scan().expect("idle again after finishing");
    }
}
