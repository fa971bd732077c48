//! Application state.

pub mod store;

pub use store::{AlarmStatus, AppState, BoxedPort};
