//! Persisted entity token cache.
//!
//! Each invocation is a fresh process, so the token cache is written to the
//! cache directory between runs. Writes go through a temp file + rename.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::token::TokenCache;
use crate::error::Result;

/// JSON file holding a [`TokenCache`].
#[derive(Debug, Clone)]
pub struct TokenCacheFile {
    path: PathBuf,
}

impl TokenCacheFile {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache. Missing or unreadable files yield an empty cache.
    #[must_use]
    pub fn load(&self) -> TokenCache {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return TokenCache::new();
        };
        match serde_json::from_str(&content) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt token cache");
                TokenCache::new()
            }
        }
    }

    /// Write the cache atomically.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file cannot be written.
    pub fn save(&self, cache: &TokenCache) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let content = serde_json::to_vec_pretty(cache)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut options = std::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&tmp)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
            }
            file.write_all(&content)?;
            file.sync_all()?;
        }

        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Remove the cache file. Succeeds if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token::CachedToken;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_cache() {
        let dir = TempDir::new().unwrap();
        let file = TokenCacheFile::new(dir.path().join("entity-token.json"));
        assert!(file.load().token().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let file = TokenCacheFile::new(dir.path().join("cache/entity-token.json"));
        let token = CachedToken {
            title_id: "ABCD".to_string(),
            entity_token: "tok".to_string(),
            refresh_at: Utc::now(),
            server_expiration: None,
        };
        file.save(&TokenCache::from_token(token.clone())).unwrap();
        assert_eq!(file.load().token(), Some(&token));
        assert!(!dir.path().join("cache/entity-token.json.tmp").exists());

        file.clear().unwrap();
        assert!(file.load().token().is_none());
        file.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn saved_token_is_owner_only_even_over_a_stale_temp_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entity-token.json");
        let stale = dir.path().join("entity-token.json.tmp");
        std::fs::write(&stale, "old").unwrap();
        std::fs::set_permissions(&stale, std::fs::Permissions::from_mode(0o644)).unwrap();

        let file = TokenCacheFile::new(path.clone());
        let token = CachedToken {
            title_id: "ABCD".to_string(),
            entity_token: "tok".to_string(),
            refresh_at: Utc::now(),
            server_expiration: None,
        };
        file.save(&TokenCache::from_token(token)).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!stale.exists());
    }

    #[test]
    fn corrupt_file_is_empty_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entity-token.json");
        std::fs::write(&path, "garbage").unwrap();
        assert!(TokenCacheFile::new(path).load().token().is_none());
    }
}
