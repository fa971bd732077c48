//! Core data models for the proximity alarm.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{classify, GeoPoint, TierRadii};

/// Display value for identity fields the upstream source left out.
pub const UNKNOWN: &str = "unknown";

/// Distance-based severity of a single aircraft.
///
/// Numbered like the radii: tier 1 is the innermost ring. The alarm level is
/// the numeric maximum over all tiers seen in a scan, so `Ord` follows the
/// numbers, not urgency.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum ProximityTier {
    /// Outside every radius
    #[default]
    None = 0,
    /// Within radius 1
    Alarm = 1,
    /// Within radius 2
    Warning = 2,
    /// Within radius 3
    Detection = 3,
}

/// The device-wide severity: 0 clear through 3.
pub type AlarmLevel = ProximityTier;

impl ProximityTier {
    pub const ALL_ACTIVE: [ProximityTier; 3] = [
        ProximityTier::Alarm,
        ProximityTier::Warning,
        ProximityTier::Detection,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_active(self) -> bool {
        self != ProximityTier::None
    }
}

impl From<ProximityTier> for u8 {
    fn from(tier: ProximityTier) -> Self {
        tier.as_u8()
    }
}

impl TryFrom<u8> for ProximityTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ProximityTier::None),
            1 => Ok(ProximityTier::Alarm),
            2 => Ok(ProximityTier::Warning),
            3 => Ok(ProximityTier::Detection),
            other => Err(format!("proximity tier out of range: {other}")),
        }
    }
}

impl std::fmt::Display for ProximityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One aircraft record as reported by a data source, before classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAircraft {
    pub icao24: String,
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default)]
    pub origin_country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Barometric altitude in meters
    #[serde(default)]
    pub baro_altitude: Option<f64>,
    /// Ground speed in m/s
    #[serde(default)]
    pub velocity: Option<f64>,
    /// Track over ground in degrees clockwise from north
    #[serde(default)]
    pub true_track: Option<f64>,
}

/// A classified aircraft from one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftObservation {
    pub icao24: String,
    pub callsign: String,
    pub origin_country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub baro_altitude: f64,
    pub velocity: f64,
    pub true_track: f64,
    pub distance_km: f64,
    pub proximity_level: ProximityTier,
}

impl AircraftObservation {
    /// Classify a raw record against the configured center and radii.
    ///
    /// Returns `None` when the record has no usable position. Missing
    /// telemetry defaults to 0 and missing identity text to [`UNKNOWN`].
    pub fn classify(raw: &RawAircraft, center: GeoPoint, radii: &TierRadii) -> Option<Self> {
        let latitude = raw.latitude.filter(|v| v.is_finite())?;
        let longitude = raw.longitude.filter(|v| v.is_finite())?;

        let distance_km = center.distance_km(&GeoPoint::new(latitude, longitude)).max(0.0);

        Some(Self {
            icao24: raw.icao24.clone(),
            callsign: display_or_unknown(raw.callsign.as_deref()),
            origin_country: display_or_unknown(raw.origin_country.as_deref()),
            latitude,
            longitude,
            baro_altitude: raw.baro_altitude.unwrap_or(0.0),
            velocity: raw.velocity.unwrap_or(0.0),
            true_track: raw.true_track.unwrap_or(0.0),
            distance_km,
            proximity_level: classify(distance_km, radii),
        })
    }
}

fn display_or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Outcome of one scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Success,
    NetworkError,
    ParseError,
    NoData,
}

impl ScanStatus {
    pub fn is_success(self) -> bool {
        self == ScanStatus::Success
    }
}

/// Per-tier aircraft counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub level1: usize,
    pub level2: usize,
    pub level3: usize,
}

impl TierCounts {
    pub fn from_observations(observations: &[AircraftObservation]) -> Self {
        let mut counts = Self::default();
        for observation in observations {
            match observation.proximity_level {
                ProximityTier::Alarm => counts.level1 += 1,
                ProximityTier::Warning => counts.level2 += 1,
                ProximityTier::Detection => counts.level3 += 1,
                ProximityTier::None => {}
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.level1 + self.level2 + self.level3
    }
}

/// Immutable record of one scan kept in the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub counts: TierCounts,
    pub total: usize,
    pub status: ScanStatus,
    /// Failure detail for non-success scans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Aircraft with tier > 0 at the time of the scan
    #[serde(rename = "flights_at_scan")]
    pub observations: Vec<AircraftObservation>,
}

impl ScanSummary {
    pub fn success(timestamp: DateTime<Utc>, observations: Vec<AircraftObservation>) -> Self {
        let counts = TierCounts::from_observations(&observations);
        Self {
            timestamp,
            counts,
            total: counts.total(),
            status: ScanStatus::Success,
            detail: None,
            observations,
        }
    }

    pub fn failure(timestamp: DateTime<Utc>, status: ScanStatus, detail: Option<String>) -> Self {
        Self {
            timestamp,
            counts: TierCounts::default(),
            total: 0,
            status,
            detail,
            observations: Vec::new(),
        }
    }
}
