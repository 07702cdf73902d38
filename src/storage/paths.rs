//! Application paths for config and cache.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable relocating every pfmp file under one directory.
pub const ENV_HOME: &str = "PFMP_HOME";

/// Application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Configuration directory (config file, file-backed credentials).
    pub config: PathBuf,
    /// Cache directory (entity token).
    pub cache: PathBuf,
}

impl AppPaths {
    /// Platform paths, or `$PFMP_HOME/{config,cache}` when set.
    #[must_use]
    pub fn new() -> Self {
        if let Some(home) = std::env::var_os(ENV_HOME).filter(|h| !h.is_empty()) {
            return Self::under(Path::new(&home));
        }
        if let Some(proj_dirs) = ProjectDirs::from("com", "playfab", "pfmp") {
            Self {
                config: proj_dirs.config_dir().to_path_buf(),
                cache: proj_dirs.cache_dir().to_path_buf(),
            }
        } else {
            let home = directories::BaseDirs::new()
                .map_or_else(|| PathBuf::from("."), |d| d.home_dir().to_path_buf());
            Self {
                config: home.join(".config/pfmp"),
                cache: home.join(".cache/pfmp"),
            }
        }
    }

    /// Paths rooted at an explicit directory.
    #[must_use]
    pub fn under(root: &Path) -> Self {
        Self {
            config: root.join("config"),
            cache: root.join("cache"),
        }
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    #[must_use]
    pub fn credentials_file(&self) -> PathBuf {
        self.config.join("credentials.json")
    }

    #[must_use]
    pub fn token_cache_file(&self) -> PathBuf {
        self.cache.join("entity-token.json")
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
