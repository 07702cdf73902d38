//! Shared helpers for integration tests.
//!
//! - `cli`: isolated invocations of the `pfmp` binary
//! - `log_capture`: collects tracing events for assertions
//! - `mock`: wiremock backend for the multiplayer API and blob storage

pub mod cli;
pub mod log_capture;
pub mod mock;
