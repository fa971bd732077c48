//! Shared library surface for the alarm server binaries and tests.

pub mod actuators;
pub mod api;
pub mod clips;
pub mod config;
pub mod loops;
pub mod persistence;
pub mod state;
