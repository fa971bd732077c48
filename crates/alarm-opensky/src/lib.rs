//! OpenSky data source for the flight alarm.
//!
//! Queries the `/states/all` endpoint for a bounding box and decodes the
//! positional state vectors into [`alarm_core::RawAircraft`] records.

pub mod client;

pub use client::{parse_states, Credentials, OpenSkyClient, DEFAULT_BASE_URL};
