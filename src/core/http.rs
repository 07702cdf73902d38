//! HTTP client utilities.
//!
//! Provides the shared HTTP client for API calls and blob uploads.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::error::{PfmpError, Result};

/// Default timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("pfmp/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PfmpError::Network(e.to_string()))
}

/// Map a transport-level reqwest error to a pfmp error.
#[must_use]
pub fn classify_send_error(error: &reqwest::Error, timeout: Duration) -> PfmpError {
    if error.is_timeout() {
        PfmpError::Timeout(timeout.as_secs())
    } else {
        PfmpError::Network(error.to_string())
    }
}

/// Shorten a response body for inclusion in an error message.
#[must_use]
pub fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(MAX).collect();
        format!("{cut}...")
    }
}
