//! Configuration file loading and resolution.
//!
//! Loads configuration from `<config dir>/config.toml` (see [`AppPaths`]).
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `PFMP_PRODUCTION_URL`: API host suffix or full base URL
//! - `PFMP_TIMEOUT`: Request timeout in seconds
//! - `PFMP_PAGE_SIZE`: Page size for list operations
//! - `PFMP_FORMAT`: Output format (human, json)
//! - `PFMP_NO_COLOR` or `NO_COLOR`: Disable colors
//! - `PFMP_PRETTY`: Pretty-print JSON output (1, true, yes)
//! - `PFMP_CONFIG`: Override config file path

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AppPaths;
use super::credentials::CredentialBackend;
use crate::cli::args::{Cli, OutputFormat};
use crate::core::api::{DEFAULT_PAGE_SIZE, DEFAULT_PRODUCTION_ENVIRONMENT_URL};
use crate::core::blob::UploadSettings;
use crate::error::{PfmpError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

pub const ENV_PRODUCTION_URL: &str = "PFMP_PRODUCTION_URL";
pub const ENV_TIMEOUT: &str = "PFMP_TIMEOUT";
pub const ENV_PAGE_SIZE: &str = "PFMP_PAGE_SIZE";
pub const ENV_FORMAT: &str = "PFMP_FORMAT";
pub const ENV_NO_COLOR: &str = "PFMP_NO_COLOR";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";
pub const ENV_PRETTY: &str = "PFMP_PRETTY";
/// Environment variable to override config file path.
pub const ENV_CONFIG: &str = "PFMP_CONFIG";

const MAX_TIMEOUT_SECONDS: u64 = 300;
const MAX_PAGE_SIZE: u32 = 1000;
const MAX_BLOCK_SIZE_MB: u64 = 4000;

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved configuration after merging CLI, env vars, and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub format: OutputFormat,
    pub pretty: bool,
    pub no_color: bool,
    pub timeout: Duration,
    pub production_environment_url: String,
    pub page_size: u32,
    pub credential_store: CredentialBackend,
    pub upload: UploadSettings,
    /// Config file that was read (it may not exist).
    pub config_path: PathBuf,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub format: ConfigSource,
    pub pretty: ConfigSource,
    pub no_color: ConfigSource,
    pub timeout: ConfigSource,
    pub production_environment_url: ConfigSource,
    pub page_size: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, environment variables, and config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if any resolved value is out of range.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let config_path = Self::config_path();
        let config = Config::load_from(&config_path)?;
        config.validate()?;

        let mut sources = ConfigSources::default();

        let format = Self::resolve_format(cli, &config, &mut sources.format)?;
        let pretty = Self::resolve_pretty(cli, &config, &mut sources.pretty);
        let no_color = Self::resolve_no_color(cli, &config, &mut sources.no_color);
        let timeout = Self::resolve_timeout(cli, &config, &mut sources.timeout)?;
        let production_environment_url = Self::resolve_production_url(
            cli,
            &config,
            &mut sources.production_environment_url,
        );
        let page_size = Self::resolve_page_size(&config, &mut sources.page_size)?;

        let upload = UploadSettings {
            max_retries: config.upload.max_retries,
            retry_base_delay: Duration::from_millis(config.upload.retry_base_delay_ms),
            block_size: config.upload.block_size_mb * 1024 * 1024,
            single_put_limit: config.upload.single_put_limit_mb * 1024 * 1024,
            timeout,
        };

        Ok(Self {
            format,
            pretty,
            no_color,
            timeout,
            production_environment_url,
            page_size,
            credential_store: config.credentials.store,
            upload,
            config_path,
            sources,
        })
    }

    /// Config file path, respecting the `PFMP_CONFIG` override.
    #[must_use]
    pub fn config_path() -> PathBuf {
        std::env::var_os(ENV_CONFIG)
            .filter(|p| !p.is_empty())
            .map_or_else(|| AppPaths::new().config_file(), PathBuf::from)
    }

    fn resolve_format(
        cli: &Cli,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Result<OutputFormat> {
        if let Some(format) = cli.cli_format() {
            *source = ConfigSource::Cli;
            return Ok(format);
        }

        if let Ok(value) = std::env::var(ENV_FORMAT) {
            *source = ConfigSource::Env;
            return Self::parse_format(ENV_FORMAT, &value);
        }

        if let Some(ref value) = config.output.format {
            *source = ConfigSource::ConfigFile;
            return Self::parse_format("output.format", value);
        }

        *source = ConfigSource::Default;
        Ok(OutputFormat::Human)
    }

    fn parse_format(key: &str, value: &str) -> Result<OutputFormat> {
        OutputFormat::from_arg(value).ok_or_else(|| PfmpError::ConfigInvalid {
            key: key.to_string(),
            value: value.to_string(),
            message: "valid formats: human, json".to_string(),
        })
    }

    fn resolve_pretty(cli: &Cli, config: &Config, source: &mut ConfigSource) -> bool {
        if cli.pretty {
            *source = ConfigSource::Cli;
            return true;
        }

        if Self::is_env_truthy(ENV_PRETTY) {
            *source = ConfigSource::Env;
            return true;
        }

        if config.output.pretty {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }

    fn resolve_no_color(cli: &Cli, config: &Config, source: &mut ConfigSource) -> bool {
        if cli.no_color {
            *source = ConfigSource::Cli;
            return true;
        }

        if Self::is_env_truthy(ENV_NO_COLOR) || std::env::var_os(ENV_NO_COLOR_STD).is_some() {
            *source = ConfigSource::Env;
            return true;
        }

        if config.output.no_color {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }

    fn resolve_timeout(cli: &Cli, config: &Config, source: &mut ConfigSource) -> Result<Duration> {
        let seconds = if let Some(seconds) = cli.timeout {
            *source = ConfigSource::Cli;
            Self::check_range("--timeout", seconds, 1, MAX_TIMEOUT_SECONDS)?
        } else if let Ok(value) = std::env::var(ENV_TIMEOUT) {
            *source = ConfigSource::Env;
            let seconds = Self::parse_number(ENV_TIMEOUT, &value)?;
            Self::check_range(ENV_TIMEOUT, seconds, 1, MAX_TIMEOUT_SECONDS)?
        } else if config.api.timeout_seconds != ApiConfig::default().timeout_seconds {
            *source = ConfigSource::ConfigFile;
            config.api.timeout_seconds
        } else {
            *source = ConfigSource::Default;
            config.api.timeout_seconds
        };
        Ok(Duration::from_secs(seconds))
    }

    fn resolve_production_url(cli: &Cli, config: &Config, source: &mut ConfigSource) -> String {
        if let Some(ref url) = cli.production_environment_url {
            *source = ConfigSource::Cli;
            return url.clone();
        }

        if let Ok(url) = std::env::var(ENV_PRODUCTION_URL) {
            if !url.trim().is_empty() {
                *source = ConfigSource::Env;
                return url;
            }
        }

        if let Some(ref url) = config.api.production_environment_url {
            *source = ConfigSource::ConfigFile;
            return url.clone();
        }

        *source = ConfigSource::Default;
        DEFAULT_PRODUCTION_ENVIRONMENT_URL.to_string()
    }

    fn resolve_page_size(config: &Config, source: &mut ConfigSource) -> Result<u32> {
        if let Ok(value) = std::env::var(ENV_PAGE_SIZE) {
            *source = ConfigSource::Env;
            let size = Self::parse_number(ENV_PAGE_SIZE, &value)?;
            let size = Self::check_range(ENV_PAGE_SIZE, size, 1, u64::from(MAX_PAGE_SIZE))?;
            return u32::try_from(size).map_err(|_| PfmpError::ConfigInvalid {
                key: ENV_PAGE_SIZE.to_string(),
                value,
                message: "too large".to_string(),
            });
        }

        *source = if config.api.page_size == DEFAULT_PAGE_SIZE {
            ConfigSource::Default
        } else {
            ConfigSource::ConfigFile
        };
        Ok(config.api.page_size)
    }

    fn parse_number(key: &str, value: &str) -> Result<u64> {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| PfmpError::ConfigInvalid {
                key: key.to_string(),
                value: value.to_string(),
                message: "expected a whole number".to_string(),
            })
    }

    fn check_range(key: &str, value: u64, min: u64, max: u64) -> Result<u64> {
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(PfmpError::ConfigInvalid {
                key: key.to_string(),
                value: value.to_string(),
                message: format!("must be between {min} and {max}"),
            })
        }
    }

    /// Check if an environment variable is set to a truthy value.
    fn is_env_truthy(var: &str) -> bool {
        std::env::var(var)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false)
    }
}

// =============================================================================
// Config file
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub credentials: CredentialsConfig,
    pub upload: UploadConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host suffix appended to the title id, or a full base URL.
    pub production_environment_url: Option<String>,
    pub timeout_seconds: u64,
    pub page_size: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub store: CredentialBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub block_size_mb: u64,
    pub single_put_limit_mb: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json).
    pub format: Option<String>,
    pub no_color: bool,
    pub pretty: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            production_environment_url: None,
            timeout_seconds: 30,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay_ms: 4000,
            block_size_mb: 4,
            single_put_limit_mb: 64,
        }
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    ///
    /// # Errors
    /// `ConfigParse` if the file exists but is not valid TOML for this schema.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PfmpError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| PfmpError::Other(anyhow::anyhow!("failed to serialize config: {e}")))?;

        fs::write(path, content)?;
        tracing::debug!(?path, "Config file saved");
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// `ConfigInvalid` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, value: String, message: &str| PfmpError::ConfigInvalid {
            key: key.to_string(),
            value,
            message: message.to_string(),
        };

        if let Some(format) = &self.output.format {
            if OutputFormat::from_arg(format).is_none() {
                return Err(invalid(
                    "output.format",
                    format.clone(),
                    "valid formats: human, json",
                ));
            }
        }

        if self.api.timeout_seconds == 0 || self.api.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(invalid(
                "api.timeout_seconds",
                self.api.timeout_seconds.to_string(),
                "must be between 1 and 300",
            ));
        }

        if self.api.page_size == 0 || self.api.page_size > MAX_PAGE_SIZE {
            return Err(invalid(
                "api.page_size",
                self.api.page_size.to_string(),
                "must be between 1 and 1000",
            ));
        }

        if self.upload.block_size_mb == 0 || self.upload.block_size_mb > MAX_BLOCK_SIZE_MB {
            return Err(invalid(
                "upload.block_size_mb",
                self.upload.block_size_mb.to_string(),
                "must be between 1 and 4000",
            ));
        }

        if self.upload.single_put_limit_mb == 0 {
            return Err(invalid(
                "upload.single_put_limit_mb",
                "0".to_string(),
                "must be positive",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::{NamedTempFile, TempDir};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_ENV: &[&str] = &[
        ENV_PRODUCTION_URL,
        ENV_TIMEOUT,
        ENV_PAGE_SIZE,
        ENV_FORMAT,
        ENV_NO_COLOR,
        ENV_NO_COLOR_STD,
        ENV_PRETTY,
        ENV_CONFIG,
    ];

    /// Runs `f` with only the given pfmp variables set and a config file
    /// pointing into an empty temp dir unless `PFMP_CONFIG` is given.
    #[allow(unsafe_code)]
    fn with_env(vars: &[(&str, &str)], f: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let dir = TempDir::new().unwrap();
        let saved: Vec<_> = ALL_ENV.iter().map(|k| (*k, std::env::var(k).ok())).collect();
        // SAFETY: serialized by ENV_LOCK
        unsafe {
            for key in ALL_ENV {
                std::env::remove_var(key);
            }
            std::env::set_var(ENV_CONFIG, dir.path().join("config.toml"));
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
        }
        f();
        unsafe {
            for (key, value) in saved {
                match value {
                    Some(v) => std::env::set_var(key, v),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["pfmp"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["qos", "list"]);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.api.page_size, 10);
        assert_eq!(config.upload.max_retries, 3);
        assert_eq!(config.credentials.store, CredentialBackend::File);
    }

    #[test]
    fn load_missing_file_returns_default() {
        let config = Config::load_from(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    fn load_valid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
production_environment_url = ".example.test"
timeout_seconds = 60

[credentials]
store = "keyring"

[upload]
max_retries = 5

[output]
pretty = true
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.api.timeout_seconds, 60);
        assert_eq!(config.api.page_size, 10);
        assert_eq!(config.credentials.store, CredentialBackend::Keyring);
        assert_eq!(config.upload.max_retries, 5);
        assert_eq!(config.upload.block_size_mb, 4);
        assert!(config.output.pretty);
    }

    #[test]
    fn load_invalid_toml_returns_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();
        assert!(matches!(
            Config::load_from(file.path()),
            Err(PfmpError::ConfigParse { .. })
        ));
    }

    #[test]
    fn roundtrip_save_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.api.page_size = 50;
        config.output.format = Some("json".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.page_size, 50);
        assert_eq!(loaded.output.format.as_deref(), Some("json"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.format = Some("md".to_string());
        assert!(matches!(
            config.validate(),
            Err(PfmpError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI flag");
        assert_eq!(ConfigSource::Env.to_string(), "environment variable");
        assert_eq!(ConfigSource::ConfigFile.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }

    #[test]
    fn resolved_defaults() {
        with_env(&[], || {
            let resolved = ResolvedConfig::resolve(&cli(&[])).unwrap();
            assert_eq!(resolved.format, OutputFormat::Human);
            assert_eq!(resolved.sources.format, ConfigSource::Default);
            assert_eq!(resolved.timeout, Duration::from_secs(30));
            assert_eq!(resolved.production_environment_url, ".playfabapi.com");
            assert_eq!(resolved.page_size, 10);
            assert_eq!(resolved.upload.block_size, 4 * 1024 * 1024);
            assert!(!resolved.pretty);
            assert!(!resolved.no_color);
        });
    }

    #[test]
    fn cli_beats_env() {
        with_env(&[(ENV_FORMAT, "human"), (ENV_TIMEOUT, "90")], || {
            let resolved = ResolvedConfig::resolve(&cli(&["--json", "--timeout", "5"])).unwrap();
            assert_eq!(resolved.format, OutputFormat::Json);
            assert_eq!(resolved.sources.format, ConfigSource::Cli);
            assert_eq!(resolved.timeout, Duration::from_secs(5));
            assert_eq!(resolved.sources.timeout, ConfigSource::Cli);
        });
    }

    #[test]
    fn env_beats_file() {
        with_env(&[(ENV_PRODUCTION_URL, "http://127.0.0.1:9"), (ENV_PAGE_SIZE, "25")], || {
            let path = ResolvedConfig::config_path();
            std::fs::write(
                &path,
                "[api]\nproduction_environment_url = \".file.test\"\npage_size = 3\n",
            )
            .unwrap();
            let resolved = ResolvedConfig::resolve(&cli(&[])).unwrap();
            assert_eq!(resolved.production_environment_url, "http://127.0.0.1:9");
            assert_eq!(resolved.sources.production_environment_url, ConfigSource::Env);
            assert_eq!(resolved.page_size, 25);
        });
    }

    #[test]
    fn file_values_apply() {
        with_env(&[], || {
            let path = ResolvedConfig::config_path();
            std::fs::write(
                &path,
                "[output]\nformat = \"json\"\nno_color = true\n\n[upload]\nretry_base_delay_ms = 10\n",
            )
            .unwrap();
            let resolved = ResolvedConfig::resolve(&cli(&[])).unwrap();
            assert_eq!(resolved.format, OutputFormat::Json);
            assert_eq!(resolved.sources.format, ConfigSource::ConfigFile);
            assert!(resolved.no_color);
            assert_eq!(resolved.upload.retry_base_delay, Duration::from_millis(10));
        });
    }

    #[test]
    fn invalid_env_values_are_config_errors() {
        with_env(&[(ENV_TIMEOUT, "soon")], || {
            assert!(matches!(
                ResolvedConfig::resolve(&cli(&[])),
                Err(PfmpError::ConfigInvalid { .. })
            ));
        });
        with_env(&[(ENV_FORMAT, "xml")], || {
            assert!(ResolvedConfig::resolve(&cli(&[])).is_err());
        });
        with_env(&[(ENV_PAGE_SIZE, "0")], || {
            assert!(ResolvedConfig::resolve(&cli(&[])).is_err());
        });
    }

    #[test]
    fn standard_no_color_is_honoured() {
        with_env(&[(ENV_NO_COLOR_STD, "")], || {
            let resolved = ResolvedConfig::resolve(&cli(&[])).unwrap();
            assert!(resolved.no_color);
            assert_eq!(resolved.sources.no_color, ConfigSource::Env);
        });
    }
}
