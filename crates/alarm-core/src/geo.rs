//! Great-circle math, query boxes and proximity tier classification.

use serde::{Deserialize, Serialize};

use crate::models::ProximityTier;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres spanned by one degree of latitude on the mean sphere.
pub const KM_PER_DEG_LAT: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Calculate the great-circle distance between two points in kilometres.
///
/// NaN inputs propagate to a NaN result; callers drop observations without
/// coordinates before getting here.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// The three alert radii in kilometres, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRadii {
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
}

impl TierRadii {
    pub fn new(r1: f64, r2: f64, r3: f64) -> Self {
        Self { r1, r2, r3 }
    }

    /// True when the radii are strictly ascending.
    ///
    /// Classification still runs on misordered radii, but the resulting tiers
    /// are an artifact of comparison order rather than a severity ranking.
    pub fn is_ascending(&self) -> bool {
        self.r1 < self.r2 && self.r2 < self.r3
    }

    /// Largest configured radius.
    pub fn outer(&self) -> f64 {
        self.r1.max(self.r2).max(self.r3)
    }
}

/// Assign a proximity tier to a distance.
///
/// Radii are compared in ascending tier order and the first match wins, so a
/// distance sitting exactly on a boundary gets the more severe tier.
pub fn classify(distance_km: f64, radii: &TierRadii) -> ProximityTier {
    if distance_km <= radii.r1 {
        ProximityTier::Alarm
    } else if distance_km <= radii.r2 {
        ProximityTier::Warning
    } else if distance_km <= radii.r3 {
        ProximityTier::Detection
    } else {
        ProximityTier::None
    }
}

/// Rectangular lat/lon query region.
///
/// Upstream traffic APIs answer box queries, not radius queries, so the scan
/// asks for `center ± margin` degrees and filters by distance afterwards.
/// Aircraft inside a tier radius but outside the box are never seen. One
/// degree of longitude shrinks with latitude, so the east/west reach of the
/// box is `margin * KM_PER_DEG_LAT * cos(lat)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lon_min: f64,
    pub lat_max: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn around(center: GeoPoint, margin_deg: f64) -> Self {
        let margin = margin_deg.abs();
        Self {
            lat_min: center.lat - margin,
            lon_min: center.lon - margin,
            lat_max: center.lat + margin,
            lon_max: center.lon + margin,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.lat_min
            && point.lat <= self.lat_max
            && point.lon >= self.lon_min
            && point.lon <= self.lon_max
    }
}

/// Shortest distance in km from the center to the edge of its query box.
///
/// This is the radius the box is guaranteed to cover; anything configured
/// beyond it is partially invisible.
pub fn box_reach_km(center: GeoPoint, margin_deg: f64) -> f64 {
    let margin = margin_deg.abs();
    let north_south = margin * KM_PER_DEG_LAT;
    let east_west = margin * KM_PER_DEG_LAT * center.lat.to_radians().cos().abs();
    north_south.min(east_west)
}
