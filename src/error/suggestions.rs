//! Fix suggestion database for pfmp errors.
//!
//! Provides actionable fix suggestions mapped to specific error types,
//! including commands, context explanations, and prevention tips.

use crate::core::region::AzureRegion;

// =============================================================================
// Fix Suggestion Types
// =============================================================================

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct FixSuggestion {
    /// Fix commands in order of preference, copy-paste ready.
    pub commands: Vec<String>,

    /// Explanation of why this error occurred.
    pub context: String,

    /// Tips to prevent this error in the future.
    pub prevention: Option<String>,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }
}

// =============================================================================
// Authentication
// =============================================================================

#[must_use]
pub fn title_not_configured_suggestions() -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec!["pfmp title set --title-id <TITLE_ID> --secret-key <SECRET_KEY>".to_string()],
            "Every command authenticates as a title. No title id and secret key are stored yet.",
        )
        .with_prevention(
            "Set PFMP_TITLE_ID and PFMP_SECRET_KEY in CI environments instead of storing credentials.",
        ),
    ]
}

#[must_use]
pub fn token_rejected_suggestions(error: &str, message: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![
            "pfmp title show".to_string(),
            "pfmp title set --title-id <TITLE_ID> --secret-key <SECRET_KEY>".to_string(),
        ],
        format!("The entity token request was rejected ({error}: {message}). The title id or secret key is likely wrong or revoked."),
    )]
}

// =============================================================================
// Validation
// =============================================================================

#[must_use]
pub fn invalid_argument_suggestions(message: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["pfmp <command> --help".to_string()],
        format!("The argument combination was rejected: {message}."),
    )]
}

#[must_use]
pub fn file_not_found_suggestions(path: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("ls -l {path}")],
        "Relative paths are resolved against the current directory. Nothing was sent to the backend.",
    )]
}

#[must_use]
pub fn invalid_asset_name_suggestions(name: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("pfmp asset add --file <PATH> --asset-name {name}.zip")],
        "Game server assets must be archives ending in .zip, .tar.gz or .tar.",
    )]
}

#[must_use]
pub fn invalid_region_suggestions(region: &str) -> Vec<FixSuggestion> {
    let known: Vec<&str> = AzureRegion::ALL.iter().map(|r| r.as_str()).collect();
    vec![FixSuggestion::new(
        Vec::new(),
        format!("'{region}' is not a known region. Known regions: {}.", known.join(", ")),
    )]
}

#[must_use]
pub fn build_not_found_suggestions(name: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["pfmp build list --all".to_string()],
        format!("No build name contains '{name}' (case-insensitive)."),
    )]
}

#[must_use]
pub fn ambiguous_build_suggestions(name: &str, count: usize) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![
            format!("pfmp build list --name {name}"),
            "pfmp <command> --build-id <BUILD_ID>".to_string(),
        ],
        format!("{count} builds contain '{name}'. Use a more specific name or the build id."),
    )]
}

// =============================================================================
// Network / API
// =============================================================================

#[must_use]
pub fn timeout_suggestions(seconds: u64) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("pfmp --timeout {} <command>", seconds * 2)],
            format!("The backend did not answer within {seconds}s."),
        )
        .with_prevention("Raise api.timeout_seconds in config.toml for slow links."),
    ]
}

#[must_use]
pub fn network_suggestions(message: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["pfmp title token --force".to_string()],
        format!("Could not reach the backend: {message}. Check connectivity and --production-environment-url."),
    )]
}

#[must_use]
pub fn api_error_suggestions(operation: &str, http_status: u16, error: &str) -> Vec<FixSuggestion> {
    let context = match http_status {
        400 => format!("{operation} rejected the request parameters ({error})."),
        401 | 403 => format!(
            "{operation} was not authorized ({error}). The title may not be enabled for multiplayer servers."
        ),
        404 => format!("{operation} could not find the requested resource ({error})."),
        429 => format!("{operation} was throttled ({error}). Wait and try again."),
        s if s >= 500 => format!("{operation} failed on the server ({error}). Try again later."),
        _ => format!("{operation} failed with HTTP {http_status} ({error})."),
    };

    let commands = if http_status == 401 || http_status == 403 {
        vec!["pfmp server enable".to_string(), "pfmp title token --force".to_string()]
    } else {
        vec!["pfmp --log-level debug <command>".to_string()]
    };

    vec![FixSuggestion::new(commands, context)]
}

#[must_use]
pub fn upload_suggestions(status: Option<u16>, message: &str) -> Vec<FixSuggestion> {
    let context = match status {
        Some(403) => format!("The upload URL was refused ({message}). Upload URLs expire; run the command again to get a new one."),
        Some(code) => format!("Blob storage answered HTTP {code}: {message}."),
        None => format!("The upload did not complete: {message}."),
    };
    vec![
        FixSuggestion::new(vec!["pfmp asset add --file <PATH>".to_string()], context)
            .with_prevention("Raise upload.max_retries in config.toml on unreliable links."),
    ]
}

// =============================================================================
// Configuration
// =============================================================================

#[must_use]
pub fn config_parse_suggestions(path: &str, message: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("$EDITOR {path}")],
        format!("The config file is not valid TOML: {message}."),
    )]
}

#[must_use]
pub fn config_invalid_suggestions(key: &str, value: &str, message: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        Vec::new(),
        format!("'{value}' is not valid for {key}: {message}."),
    )]
}

#[must_use]
pub fn credential_store_suggestions(message: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec!["pfmp title clear".to_string()],
            format!("Stored title credentials could not be accessed: {message}."),
        )
        .with_prevention("Set credentials.store = \"file\" in config.toml when no OS keyring is available."),
    ]
}
