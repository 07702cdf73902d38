//! Error types for pfmp.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! - **Authentication**: no title configured, entity token rejected
//! - **Validation**: missing or contradictory arguments, missing files
//! - **Network**: connection failures and timeouts
//! - **Api**: errors reported by the multiplayer backend
//! - **Storage**: blob upload failures
//! - **Configuration**: config file and credential store problems
//! - **Internal**: I/O, serialization and unclassified errors
//!
//! Each error has a stable error code (e.g., `PFMP-V001`) for programmatic handling.

pub mod suggestions;

use thiserror::Error;

pub use suggestions::FixSuggestion;

/// Remote operation name used by the entity token endpoint.
pub const ENTITY_TOKEN_OPERATION: &str = "GetEntityToken";

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Title credentials missing or rejected.
    Authentication,
    /// Local argument or file validation.
    Validation,
    /// Network issues (timeout, connection refused).
    Network,
    /// Errors reported by the remote API.
    Api,
    /// Blob storage upload failures.
    Storage,
    /// Configuration issues (parse errors, invalid values, credential store).
    Configuration,
    /// Internal errors (bugs, unexpected state, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Authentication => "Authentication error",
            Self::Validation => "Invalid argument",
            Self::Network => "Network error",
            Self::Api => "API error",
            Self::Storage => "Storage error",
            Self::Configuration => "Configuration error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Authentication => "A",
            Self::Validation => "V",
            Self::Network => "N",
            Self::Api => "R",
            Self::Storage => "S",
            Self::Configuration => "C",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Missing or contradictory arguments, bad configuration
    InvalidArgument = 2,
    /// The remote API reported an error
    ApiError = 3,
    /// Timeout
    Timeout = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Main error type for pfmp operations.
#[derive(Error, Debug)]
pub enum PfmpError {
    // ==========================================================================
    // Authentication errors
    // ==========================================================================
    /// No title id / secret key has been stored.
    #[error("no title configured; run `pfmp title set` before running any other command")]
    TitleNotConfigured,

    // ==========================================================================
    // Validation errors
    // ==========================================================================
    /// Missing or contradictory arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A file passed on the command line does not exist.
    #[error("file {path} does not exist")]
    FileNotFound { path: String },

    /// Asset names must carry an archive extension.
    #[error("invalid asset name '{name}': expected a .zip, .tar.gz or .tar file")]
    InvalidAssetName { name: String },

    /// Unknown Azure region name.
    #[error("unknown region: {0}")]
    InvalidRegion(String),

    /// No build matched the requested name.
    #[error("build {name} not found")]
    BuildNotFound { name: String },

    /// More than one build matched the requested name.
    #[error("more than one build matched {name} ({count} matches)")]
    AmbiguousBuildName { name: String, count: usize },

    // ==========================================================================
    // Network errors
    // ==========================================================================
    /// Request timed out.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    // ==========================================================================
    // Remote API errors
    // ==========================================================================
    /// The backend returned an error envelope.
    #[error("error occurred while calling {operation}: {error} ({message})")]
    Api {
        operation: String,
        http_status: u16,
        error: String,
        error_code: Option<i64>,
        message: String,
        details: Option<String>,
    },

    /// Response body could not be decoded.
    #[error("failed to parse response: {0}")]
    ParseResponse(String),

    // ==========================================================================
    // Storage errors
    // ==========================================================================
    /// Blob upload failed after retries.
    #[error("upload failed: {message}")]
    Upload {
        status: Option<u16>,
        message: String,
    },

    /// Waiting for a remote state change exceeded the allowed time.
    #[error("gave up waiting after {seconds}s: {what}")]
    WaitExceeded { what: String, seconds: u64 },

    // ==========================================================================
    // Configuration errors
    // ==========================================================================
    /// Error parsing configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Invalid value in configuration or environment.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid {
        key: String,
        value: String,
        message: String,
    },

    /// Credential store could not be read or written.
    #[error("credential store error: {0}")]
    CredentialStore(String),

    // ==========================================================================
    // Internal errors
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PfmpError {
    /// Shorthand for the "exactly one of" selector errors.
    #[must_use]
    pub fn exactly_one_of(names: &[&str]) -> Self {
        Self::InvalidArgument(format!(
            "exactly one of {} should be specified",
            names.join(", ")
        ))
    }

    /// Map error to process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidArgument(_)
            | Self::FileNotFound { .. }
            | Self::InvalidAssetName { .. }
            | Self::InvalidRegion(_)
            | Self::BuildNotFound { .. }
            | Self::AmbiguousBuildName { .. }
            | Self::TitleNotConfigured
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. } => ExitCode::InvalidArgument,

            Self::Api { .. } | Self::ParseResponse(_) => ExitCode::ApiError,

            Self::Timeout(_) | Self::WaitExceeded { .. } => ExitCode::Timeout,

            Self::Network(_)
            | Self::Upload { .. }
            | Self::CredentialStore(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TitleNotConfigured => ErrorCategory::Authentication,
            Self::Api { operation, .. } if operation == ENTITY_TOKEN_OPERATION => {
                ErrorCategory::Authentication
            }

            Self::InvalidArgument(_)
            | Self::FileNotFound { .. }
            | Self::InvalidAssetName { .. }
            | Self::InvalidRegion(_)
            | Self::BuildNotFound { .. }
            | Self::AmbiguousBuildName { .. } => ErrorCategory::Validation,

            Self::Timeout(_) | Self::Network(_) => ErrorCategory::Network,

            Self::Api { .. } | Self::ParseResponse(_) | Self::WaitExceeded { .. } => {
                ErrorCategory::Api
            }

            Self::Upload { .. } => ErrorCategory::Storage,

            Self::ConfigParse { .. } | Self::ConfigInvalid { .. } | Self::CredentialStore(_) => {
                ErrorCategory::Configuration
            }

            Self::Io(_) | Self::Json(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Stable error code, e.g. `PFMP-V001`.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TitleNotConfigured => "PFMP-A001",
            Self::Api { operation, .. } if operation == ENTITY_TOKEN_OPERATION => "PFMP-A002",

            Self::InvalidArgument(_) => "PFMP-V001",
            Self::FileNotFound { .. } => "PFMP-V002",
            Self::InvalidAssetName { .. } => "PFMP-V003",
            Self::InvalidRegion(_) => "PFMP-V004",
            Self::BuildNotFound { .. } => "PFMP-V005",
            Self::AmbiguousBuildName { .. } => "PFMP-V006",

            Self::Timeout(_) => "PFMP-N001",
            Self::Network(_) => "PFMP-N002",

            Self::Api { .. } => "PFMP-R001",
            Self::ParseResponse(_) => "PFMP-R002",
            Self::WaitExceeded { .. } => "PFMP-R003",

            Self::Upload { .. } => "PFMP-S001",

            Self::ConfigParse { .. } => "PFMP-C001",
            Self::ConfigInvalid { .. } => "PFMP-C002",
            Self::CredentialStore(_) => "PFMP-C003",

            Self::Io(_) => "PFMP-X001",
            Self::Json(_) => "PFMP-X002",
            Self::Other(_) => "PFMP-X003",
        }
    }

    /// Whether repeating the command might succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) | Self::WaitExceeded { .. } => true,
            Self::Api { http_status, .. } => *http_status >= 500 || *http_status == 429,
            Self::Upload { status, .. } => match status {
                Some(code) => *code >= 500 || *code == 429 || *code == 408,
                None => true,
            },
            _ => false,
        }
    }

    /// Actionable suggestions for resolving this error.
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self {
            Self::TitleNotConfigured => suggestions::title_not_configured_suggestions(),
            Self::Api {
                operation,
                error,
                message,
                ..
            } if operation == ENTITY_TOKEN_OPERATION => {
                suggestions::token_rejected_suggestions(error, message)
            }
            Self::InvalidArgument(msg) => suggestions::invalid_argument_suggestions(msg),
            Self::FileNotFound { path } => suggestions::file_not_found_suggestions(path),
            Self::InvalidAssetName { name } => suggestions::invalid_asset_name_suggestions(name),
            Self::InvalidRegion(region) => suggestions::invalid_region_suggestions(region),
            Self::BuildNotFound { name } => suggestions::build_not_found_suggestions(name),
            Self::AmbiguousBuildName { name, count } => {
                suggestions::ambiguous_build_suggestions(name, *count)
            }
            Self::Timeout(seconds) => suggestions::timeout_suggestions(*seconds),
            Self::Network(msg) => suggestions::network_suggestions(msg),
            Self::Api {
                operation,
                http_status,
                error,
                ..
            } => suggestions::api_error_suggestions(operation, *http_status, error),
            Self::ParseResponse(msg) => vec![FixSuggestion::new(
                vec!["pfmp --log-level debug <command>".to_string()],
                format!("The backend returned a response pfmp could not decode: {msg}"),
            )],
            Self::Upload { status, message } => suggestions::upload_suggestions(*status, message),
            Self::WaitExceeded { what, .. } => vec![FixSuggestion::new(
                vec!["pfmp server enable --max-wait 1800".to_string()],
                format!("The backend has not finished: {what}. It may still complete."),
            )],
            Self::ConfigParse { path, message } => {
                suggestions::config_parse_suggestions(path, message)
            }
            Self::ConfigInvalid {
                key,
                value,
                message,
            } => suggestions::config_invalid_suggestions(key, value, message),
            Self::CredentialStore(msg) => suggestions::credential_store_suggestions(msg),
            Self::Io(e) => vec![FixSuggestion::new(
                Vec::new(),
                format!("A file system operation failed: {e}"),
            )],
            Self::Json(e) => vec![FixSuggestion::new(
                Vec::new(),
                format!("JSON serialization failed: {e}"),
            )],
            Self::Other(e) => vec![FixSuggestion::new(Vec::new(), e.to_string())],
        }
    }
}

/// Result type alias for pfmp operations.
pub type Result<T> = std::result::Result<T, PfmpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn api_error(operation: &str, http_status: u16) -> PfmpError {
        PfmpError::Api {
            operation: operation.to_string(),
            http_status,
            error: "InvalidParams".to_string(),
            error_code: Some(1000),
            message: "Invalid input parameters".to_string(),
            details: None,
        }
    }

    fn sample_errors() -> Vec<PfmpError> {
        vec![
            PfmpError::TitleNotConfigured,
            api_error(ENTITY_TOKEN_OPERATION, 401),
            PfmpError::InvalidArgument("x".to_string()),
            PfmpError::FileNotFound {
                path: "/tmp/missing.zip".to_string(),
            },
            PfmpError::InvalidAssetName {
                name: "server.exe".to_string(),
            },
            PfmpError::InvalidRegion("Atlantis".to_string()),
            PfmpError::BuildNotFound {
                name: "alpha".to_string(),
            },
            PfmpError::AmbiguousBuildName {
                name: "alpha".to_string(),
                count: 2,
            },
            PfmpError::Timeout(30),
            PfmpError::Network("refused".to_string()),
            api_error("ListBuildSummariesV2", 400),
            PfmpError::ParseResponse("eof".to_string()),
            PfmpError::WaitExceeded {
                what: "enable".to_string(),
                seconds: 60,
            },
            PfmpError::Upload {
                status: Some(503),
                message: "busy".to_string(),
            },
            PfmpError::ConfigParse {
                path: "config.toml".to_string(),
                message: "bad".to_string(),
            },
            PfmpError::ConfigInvalid {
                key: "api.page_size".to_string(),
                value: "0".to_string(),
                message: "must be positive".to_string(),
            },
            PfmpError::CredentialStore("locked".to_string()),
            PfmpError::Io(std::io::Error::other("disk")),
            PfmpError::Other(anyhow::anyhow!("boom")),
        ]
    }

    #[test]
    fn error_codes_follow_format() {
        for err in sample_errors() {
            let code = err.error_code();
            assert!(code.starts_with("PFMP-"), "bad code {code}");
            let prefix = &code[5..6];
            assert_eq!(prefix, err.category().code_prefix(), "{code} vs {:?}", err.category());
            assert_eq!(code.len(), 9);
        }
    }

    #[test]
    fn error_codes_are_unique() {
        let errors = sample_errors();
        let codes: HashSet<_> = errors.iter().map(PfmpError::error_code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn token_endpoint_errors_are_authentication() {
        assert_eq!(
            api_error(ENTITY_TOKEN_OPERATION, 401).category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            api_error("DeleteBuild", 404).category(),
            ErrorCategory::Api
        );
    }

    #[test]
    fn exit_codes_are_correct() {
        assert_eq!(
            PfmpError::exactly_one_of(&["--name", "--id", "--all"]).exit_code(),
            ExitCode::InvalidArgument
        );
        assert_eq!(
            PfmpError::TitleNotConfigured.exit_code(),
            ExitCode::InvalidArgument
        );
        assert_eq!(api_error("GetBuild", 400).exit_code(), ExitCode::ApiError);
        assert_eq!(PfmpError::Timeout(5).exit_code(), ExitCode::Timeout);
        assert_eq!(
            PfmpError::Network("x".to_string()).exit_code(),
            ExitCode::GeneralError
        );
    }

    #[test]
    fn exactly_one_of_lists_names() {
        let err = PfmpError::exactly_one_of(&["--build-name", "--build-id"]);
        assert_eq!(
            err.to_string(),
            "invalid argument: exactly one of --build-name, --build-id should be specified"
        );
    }

    #[test]
    fn retryable_errors() {
        assert!(PfmpError::Timeout(1).is_retryable());
        assert!(api_error("GetBuild", 503).is_retryable());
        assert!(!api_error("GetBuild", 400).is_retryable());
        assert!(
            PfmpError::Upload {
                status: None,
                message: "reset".to_string()
            }
            .is_retryable()
        );
        assert!(!PfmpError::TitleNotConfigured.is_retryable());
    }

    #[test]
    fn all_error_variants_have_suggestions() {
        for err in sample_errors() {
            assert!(
                !err.fix_suggestions().is_empty(),
                "no suggestions for {err:?}"
            );
        }
    }
}
