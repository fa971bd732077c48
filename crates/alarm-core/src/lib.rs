pub mod actuator;
pub mod alarm;
pub mod audio;
pub mod engine;
pub mod geo;
pub mod history;
pub mod models;
pub mod scheduler;
pub mod settings;
pub mod source;

pub use actuator::{scale_sample, ActuatorPort, SILENCE};
pub use alarm::{AlarmState, Transition};
pub use audio::{AudioActuator, AudioState, ClipBank, ClipError, PlaybackStats, TickOutcome};
pub use engine::{ProximityEngine, ScanReport};
pub use geo::{classify, haversine_km, BoundingBox, GeoPoint, TierRadii};
pub use history::{HistoryLog, DEFAULT_HISTORY_CAPACITY};
pub use models::{
    AircraftObservation, AlarmLevel, ProximityTier, RawAircraft, ScanStatus, ScanSummary,
    TierCounts,
};
pub use scheduler::{ScanScheduler, SchedulerError, SchedulerState};
pub use settings::{AlarmSettings, SettingsError, SettingsWarning};
pub use source::{DataSource, FetchError};
