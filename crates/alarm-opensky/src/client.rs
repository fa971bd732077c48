//! OpenSky `/states/all` HTTP client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

use alarm_core::{BoundingBox, DataSource, FetchError, RawAircraft};

pub const DEFAULT_BASE_URL: &str = "https://opensky-network.org/api";

// Positions in an OpenSky state vector.
const IDX_ICAO24: usize = 0;
const IDX_CALLSIGN: usize = 1;
const IDX_ORIGIN_COUNTRY: usize = 2;
const IDX_LONGITUDE: usize = 5;
const IDX_LATITUDE: usize = 6;
const IDX_BARO_ALTITUDE: usize = 7;
const IDX_VELOCITY: usize = 9;
const IDX_TRUE_TRACK: usize = 10;

/// Basic-auth credentials for higher upstream rate limits.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// HTTP client for an OpenSky-compatible state vector API.
pub struct OpenSkyClient {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl OpenSkyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("flight-alarm/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            credentials: None,
        })
    }

    /// Empty usernames are treated as anonymous access.
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials.filter(|c| !c.username.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch all state vectors inside `bbox`.
    pub async fn query_states(&self, bbox: BoundingBox) -> Result<Vec<RawAircraft>, FetchError> {
        let url = format!("{}/states/all", self.base_url);

        let mut request = self.client.get(&url).query(&[
            ("lamin", bbox.lat_min),
            ("lomin", bbox.lon_min),
            ("lamax", bbox.lat_max),
            ("lomax", bbox.lon_max),
        ]);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request
            .send()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Network(format!("reading body: {err}")))?;

        parse_states(&body)
    }
}

impl DataSource for OpenSkyClient {
    async fn fetch_states(&self, bbox: BoundingBox) -> Result<Vec<RawAircraft>, FetchError> {
        self.query_states(bbox).await
    }
}

/// Decode a `/states/all` response body.
///
/// `states: null` and `states: []` both mean an empty sky and decode to an
/// empty list. A response object with no `states` key at all is `NoData`.
pub fn parse_states(body: &str) -> Result<Vec<RawAircraft>, FetchError> {
    let payload: Value =
        serde_json::from_str(body).map_err(|err| FetchError::Parse(err.to_string()))?;

    let Some(object) = payload.as_object() else {
        return Err(FetchError::Parse("response is not a JSON object".to_string()));
    };

    let states = match object.get("states") {
        None => return Err(FetchError::NoData),
        Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(states)) => states,
        Some(_) => return Err(FetchError::Parse("'states' is not an array".to_string())),
    };

    states
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            row.as_array()
                .map(|fields| normalize_state(fields))
                .ok_or_else(|| FetchError::Parse(format!("state {idx} is not an array")))
        })
        .collect()
}

fn normalize_state(fields: &[Value]) -> RawAircraft {
    let text = |idx: usize| {
        fields
            .get(idx)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let number = |idx: usize| fields.get(idx).and_then(Value::as_f64);

    RawAircraft {
        icao24: text(IDX_ICAO24).unwrap_or_default(),
        callsign: text(IDX_CALLSIGN),
        origin_country: text(IDX_ORIGIN_COUNTRY),
        latitude: number(IDX_LATITUDE),
        longitude: number(IDX_LONGITUDE),
        baro_altitude: number(IDX_BARO_ALTITUDE),
        velocity: number(IDX_VELOCITY),
        true_track: number(IDX_TRUE_TRACK),
    }
}
