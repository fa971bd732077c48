//! Persistence layer for the alarm server.
//!
//! Settings live in a single JSON document; scan history is memory-only.

pub mod settings;

pub use settings::{SettingsStore, SettingsUpdateError};
