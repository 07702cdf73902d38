//! Test utilities for pfmp.
//!
//! Provides shared helpers, wire-format factories, and assertion macros
//! for use across all test modules.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pfmp::test_utils::*;
//!
//! let build = make_test_build_summary("b-1", "alpha");
//! let body = ok_envelope(serde_json::json!({ "BuildSummaries": [build] }));
//! let dir = TestDir::new();
//! dir.create_file("config/config.toml", &make_test_config_toml());
//! ```

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use crate::core::models::{
    AssetSummary, BuildRegion, BuildSummary, CertificateSummary, GetBuildResponse, Metadata,
    MultiplayerServerSummary, Port, Protocol, QosServer,
};

/// Title id used by fixtures.
pub const TEST_TITLE_ID: &str = "AB12";
/// Secret key used by fixtures.
pub const TEST_SECRET_KEY: &str = "test-secret-key";
/// Entity token returned by [`entity_token_envelope`].
pub const TEST_ENTITY_TOKEN: &str = "test-entity-token";

// =============================================================================
// Test Data Factories
// =============================================================================

/// A build summary created on 2024-01-15.
#[must_use]
pub fn make_test_build_summary(id: &str, name: &str) -> BuildSummary {
    let mut metadata = Metadata::new();
    metadata.insert("team".to_string(), "core".to_string());
    BuildSummary {
        build_id: id.to_string(),
        build_name: name.to_string(),
        creation_time: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).single(),
        metadata,
    }
}

/// Full build description deployed to the given regions.
#[must_use]
pub fn make_test_build(id: &str, name: &str, regions: &[&str]) -> GetBuildResponse {
    let mut build = GetBuildResponse::from(make_test_build_summary(id, name));
    build.build_status = Some("Deployed".to_string());
    build.vm_size = Some("Standard_D2_v2".to_string());
    build.multiplayer_server_count_per_vm = Some(2);
    build.ports = vec![Port {
        name: "game".to_string(),
        num: 7777,
        protocol: Protocol::Udp,
    }];
    build.region_configurations = regions
        .iter()
        .map(|region| BuildRegion {
            region: (*region).to_string(),
            standby_servers: 1,
            max_servers: 4,
            status: Some("Deployed".to_string()),
        })
        .collect();
    build
}

#[must_use]
pub fn make_test_asset(file_name: &str) -> AssetSummary {
    AssetSummary {
        file_name: file_name.to_string(),
        metadata: Metadata::new(),
    }
}

#[must_use]
pub fn make_test_certificate(name: &str) -> CertificateSummary {
    CertificateSummary {
        name: name.to_string(),
        thumbprint: Some("A1B2C3D4".to_string()),
    }
}

/// An active server in `region`.
#[must_use]
pub fn make_test_server(server_id: &str, region: &str) -> MultiplayerServerSummary {
    MultiplayerServerSummary {
        server_id: Some(server_id.to_string()),
        session_id: Some("00000000-0000-0000-0000-000000000001".to_string()),
        state: Some("Active".to_string()),
        region: Some(region.to_string()),
        vm_id: Some("vm-1".to_string()),
        last_state_transition_time: None,
    }
}

#[must_use]
pub fn make_test_qos_server(region: &str) -> QosServer {
    QosServer {
        region: Some(region.to_string()),
        server_url: Some(format!("{}.qos.example.net", region.to_lowercase())),
    }
}

// =============================================================================
// Wire Envelopes
// =============================================================================

/// Successful response envelope around `data`.
#[must_use]
pub fn ok_envelope(data: Value) -> Value {
    json!({ "code": 200, "status": "OK", "data": data })
}

/// Error response envelope.
#[must_use]
pub fn error_envelope(code: u16, error: &str, message: &str) -> Value {
    json!({
        "code": code,
        "status": "BadRequest",
        "error": error,
        "errorCode": 1000,
        "errorMessage": message,
    })
}

/// Envelope returned by the entity token endpoint.
#[must_use]
pub fn entity_token_envelope() -> Value {
    ok_envelope(json!({
        "EntityToken": TEST_ENTITY_TOKEN,
        "TokenExpiration": "2099-01-01T00:00:00Z",
    }))
}

/// Sample config file content.
#[must_use]
pub fn make_test_config_toml() -> String {
    r#"[api]
production_environment_url = ".playfabapi.com"
timeout_seconds = 30
page_size = 10

[credentials]
store = "file"

[upload]
max_retries = 3
retry_base_delay_ms = 4000
block_size_mb = 4
single_put_limit_mb = 64

[output]
format = "human"
no_color = false
pretty = false
"#
    .to_string()
}

// =============================================================================
// Temporary Directory Helper
// =============================================================================

/// Isolated temporary directory, removed on drop.
///
/// Pass [`TestDir::path`] as `PFMP_HOME` to keep config, credentials and the
/// token cache of a test away from the real user directories.
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Create a file with the given content, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) {
        self.create_bytes(name, content.as_bytes());
    }

    /// Create a file with binary content, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_bytes(&self, name: &str, content: &[u8]) {
        let path = self.inner.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content).expect("Failed to write test file");
    }

    /// Read a file from the temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.inner.path().join(name))
    }

    #[must_use]
    pub fn file_exists(&self, name: &str) -> bool {
        self.inner.path().join(name).exists()
    }

    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a string contains a substring.
///
/// ```rust,ignore
/// use pfmp::assert_contains;
///
/// assert_contains!("build alpha created", "alpha");
/// ```
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected string to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
}

/// Assert that a string does NOT contain a substring.
#[macro_export]
macro_rules! assert_not_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            !haystack.contains(needle),
            "Expected string NOT to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
}

/// Assert that a string is valid JSON.
#[macro_export]
macro_rules! assert_json_valid {
    ($json:expr) => {
        let json = $json;
        if let Err(e) = serde_json::from_str::<serde_json::Value>(json) {
            panic!("Expected valid JSON, but parsing failed: {e}\n\nJSON string:\n{json}");
        }
    };
}

/// Assert that a string does NOT contain ANSI escape codes.
#[macro_export]
macro_rules! assert_no_ansi_codes {
    ($text:expr) => {
        let text = $text;
        assert!(
            !text.contains('\x1b'),
            "Expected string to NOT contain ANSI escape codes.\n\nActual string:\n{:?}",
            text
        );
    };
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Strip ANSI escape codes from a string.
#[must_use]
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for next in chars.by_ref() {
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::unwrap_envelope;
    use crate::core::models::ListBuildSummariesResponse;

    #[test]
    fn envelopes_decode_through_the_client_path() {
        let body = ok_envelope(json!({
            "BuildSummaries": [make_test_build_summary("b-1", "alpha")],
            "SkipToken": null,
        }));
        let page: ListBuildSummariesResponse =
            unwrap_envelope("ListBuildSummariesV2", 200, &body.to_string()).unwrap();
        assert_eq!(page.build_summaries[0].build_name, "alpha");

        let err = unwrap_envelope::<ListBuildSummariesResponse>(
            "ListBuildSummariesV2",
            400,
            &error_envelope(400, "InvalidParams", "bad").to_string(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("InvalidParams"));
    }

    #[test]
    fn build_factory_has_regions() {
        let build = make_test_build("b-1", "alpha", &["EastUs", "WestUs"]);
        assert_eq!(build.region_configurations.len(), 2);
        assert_eq!(build.ports[0].num, 7777);
    }

    #[test]
    fn test_dir_creates_nested_files() {
        let dir = TestDir::new();
        dir.create_file("config/config.toml", &make_test_config_toml());
        assert!(dir.file_exists("config/config.toml"));
        assert!(dir.read_file("config/config.toml").unwrap().contains("[upload]"));
    }

    #[test]
    fn config_fixture_parses() {
        let dir = TestDir::new();
        dir.create_file("config.toml", &make_test_config_toml());
        let config = crate::storage::Config::load_from(&dir.file_path("config.toml")).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn strip_ansi_removes_escape_sequences() {
        assert_eq!(strip_ansi_codes("\x1b[1;36mID\x1b[0m  NAME"), "ID  NAME");
    }

    #[test]
    fn assertion_macros_work() {
        assert_contains!("hello world", "world");
        assert_not_contains!("hello world", "goodbye");
        assert_json_valid!(r#"{"a": 1}"#);
        assert_no_ansi_codes!("plain");
    }
}
