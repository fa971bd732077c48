//! Live alarm settings and their validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::{box_reach_km, GeoPoint, TierRadii};

/// User-editable alarm settings, read at the start of every scan.
///
/// Field names match the persisted JSON document. Any field missing from a
/// stored document falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlarmSettings {
    pub latitude: f64,
    pub longitude: f64,
    /// Innermost radius in km
    pub radius_level1: f64,
    pub radius_level2: f64,
    /// Outermost radius in km
    pub radius_level3: f64,
    /// Seconds between scans while nothing is in range
    pub no_flight_scan_freq: u64,
    /// Seconds between scans while any aircraft is in range
    pub flight_present_scan_freq: u64,
    pub sound_warning: bool,
    /// Half-width of the upstream query box in degrees
    pub bbox_margin_deg: f64,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            latitude: 15.3582,
            longitude: 75.0210,
            radius_level1: 30.0,
            radius_level2: 50.0,
            radius_level3: 70.0,
            no_flight_scan_freq: 60,
            flight_present_scan_freq: 10,
            sound_warning: true,
            bbox_margin_deg: 1.0,
        }
    }
}

/// Settings that cannot be applied at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("coordinates out of range: lat {lat}, lon {lon}")]
    InvalidCenter { lat: f64, lon: f64 },
    #[error("radius level {level} must be a positive number of km, got {value}")]
    InvalidRadius { level: u8, value: f64 },
    #[error("{name} must be at least 1 second")]
    InvalidInterval { name: &'static str },
    #[error("bounding box margin must be a positive number of degrees, got {0}")]
    InvalidMargin(f64),
}

/// Settings that are accepted but likely to misbehave.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingsWarning {
    /// r1 < r2 < r3 does not hold; tiers become comparison-order artifacts
    RadiiNotAscending { r1: f64, r2: f64, r3: f64 },
    /// The query box does not reach the outer radius in every direction
    BoxSmallerThanRadius { reach_km: f64, outer_km: f64 },
}

impl std::fmt::Display for SettingsWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsWarning::RadiiNotAscending { r1, r2, r3 } => write!(
                f,
                "radii are not ascending ({r1} / {r2} / {r3} km); tiers will not rank severity"
            ),
            SettingsWarning::BoxSmallerThanRadius { reach_km, outer_km } => write!(
                f,
                "query box reaches only {reach_km:.1} km but the outer radius is {outer_km:.1} km; \
                 aircraft beyond the box are invisible"
            ),
        }
    }
}

impl AlarmSettings {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn radii(&self) -> TierRadii {
        TierRadii::new(self.radius_level1, self.radius_level2, self.radius_level3)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.no_flight_scan_freq)
    }

    pub fn present_interval(&self) -> Duration {
        Duration::from_secs(self.flight_present_scan_freq)
    }

    /// Reject unusable settings and list the suspicious ones.
    ///
    /// Radius ordering is not enforced, only reported.
    pub fn validate(&self) -> Result<Vec<SettingsWarning>, SettingsError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if !lat_ok || !lon_ok {
            return Err(SettingsError::InvalidCenter {
                lat: self.latitude,
                lon: self.longitude,
            });
        }

        for (level, value) in [
            (1, self.radius_level1),
            (2, self.radius_level2),
            (3, self.radius_level3),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::InvalidRadius { level, value });
            }
        }

        if self.no_flight_scan_freq == 0 {
            return Err(SettingsError::InvalidInterval {
                name: "noFlightScanFreq",
            });
        }
        if self.flight_present_scan_freq == 0 {
            return Err(SettingsError::InvalidInterval {
                name: "flightPresentScanFreq",
            });
        }
        if !self.bbox_margin_deg.is_finite() || self.bbox_margin_deg <= 0.0 {
            return Err(SettingsError::InvalidMargin(self.bbox_margin_deg));
        }

        let mut warnings = Vec::new();
        let radii = self.radii();
        if !radii.is_ascending() {
            warnings.push(SettingsWarning::RadiiNotAscending {
                r1: radii.r1,
                r2: radii.r2,
                r3: radii.r3,
            });
        }

        let reach_km = box_reach_km(self.center(), self.bbox_margin_deg);
        let outer_km = radii.outer();
        if reach_km < outer_km {
            warnings.push(SettingsWarning::BoxSmallerThanRadius { reach_km, outer_km });
        }

        Ok(warnings)
    }
}
