//! Title credential storage.
//!
//! The title id and developer secret key are stored either in a JSON file
//! under the config directory or in the OS keyring. Environment variables
//! take precedence over both.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PfmpError, Result};

/// Environment variable overriding the stored title id.
pub const ENV_TITLE_ID: &str = "PFMP_TITLE_ID";
/// Environment variable overriding the stored secret key.
pub const ENV_SECRET_KEY: &str = "PFMP_SECRET_KEY";

const KEYRING_SERVICE: &str = "pfmp";
const KEYRING_USER: &str = "title-credentials";

/// Title id and developer secret key.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TitleCredentials {
    pub title_id: String,
    pub secret_key: String,
}

impl TitleCredentials {
    /// Build credentials, rejecting blank values.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if either value is blank.
    pub fn new(title_id: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        let title_id = title_id.into().trim().to_string();
        let secret_key = secret_key.into().trim().to_string();
        if title_id.is_empty() {
            return Err(PfmpError::InvalidArgument("title id cannot be empty".to_string()));
        }
        if secret_key.is_empty() {
            return Err(PfmpError::InvalidArgument("secret key cannot be empty".to_string()));
        }
        Ok(Self {
            title_id,
            secret_key,
        })
    }

    /// Credentials from `PFMP_TITLE_ID` / `PFMP_SECRET_KEY`, if both are set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let title_id = std::env::var(ENV_TITLE_ID).ok()?;
        let secret_key = std::env::var(ENV_SECRET_KEY).ok()?;
        Self::new(title_id, secret_key).ok()
    }
}

impl std::fmt::Debug for TitleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleCredentials")
            .field("title_id", &self.title_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Backend selection for stored credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
}

impl CredentialBackend {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Some(Self::File),
            "keyring" => Some(Self::Keyring),
            _ => None,
        }
    }
}

/// Storage for title credentials.
pub trait CredentialStore {
    /// Persist credentials, replacing any stored ones.
    fn store(&self, credentials: &TitleCredentials) -> Result<()>;

    /// Load stored credentials.
    fn load(&self) -> Result<Option<TitleCredentials>>;

    /// Remove stored credentials. Succeeds if nothing is stored.
    fn delete(&self) -> Result<()>;

    /// Human-readable location for diagnostics.
    fn describe(&self) -> String;
}

/// Open the configured credential store.
///
/// # Errors
/// Returns `CredentialStore` if the keyring cannot be opened.
pub fn open_store(backend: CredentialBackend, file: PathBuf) -> Result<Box<dyn CredentialStore>> {
    match backend {
        CredentialBackend::File => Ok(Box::new(FileCredentialStore::new(file))),
        CredentialBackend::Keyring => Ok(Box::new(KeyringCredentialStore::new()?)),
    }
}

// =============================================================================
// File backend
// =============================================================================

/// Credentials as a JSON file, readable only by the owner on unix.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialStore for FileCredentialStore {
    fn store(&self, credentials: &TitleCredentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn load(&self) -> Result<Option<TitleCredentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let credentials = serde_json::from_str(&content).map_err(|e| {
            PfmpError::CredentialStore(format!("{} is corrupt: {e}", self.path.display()))
        })?;
        Ok(Some(credentials))
    }

    fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// =============================================================================
// Keyring backend
// =============================================================================

/// Credentials in the OS keyring (Keychain, Secret Service, Credential Manager).
pub struct KeyringCredentialStore {
    entry: keyring::Entry,
}

impl KeyringCredentialStore {
    /// Open the keyring entry.
    ///
    /// # Errors
    /// Returns `CredentialStore` if the keyring is unavailable.
    pub fn new() -> Result<Self> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .map_err(|e| PfmpError::CredentialStore(format!("failed to access keyring: {e}")))?;
        Ok(Self { entry })
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn store(&self, credentials: &TitleCredentials) -> Result<()> {
        let json = serde_json::to_string(credentials)?;
        self.entry
            .set_password(&json)
            .map_err(|e| PfmpError::CredentialStore(format!("failed to store credentials: {e}")))
    }

    fn load(&self) -> Result<Option<TitleCredentials>> {
        match self.entry.get_password() {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(PfmpError::CredentialStore(format!(
                "failed to load credentials: {e}"
            ))),
        }
    }

    fn delete(&self) -> Result<()> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(PfmpError::CredentialStore(format!(
                "failed to delete credentials: {e}"
            ))),
        }
    }

    fn describe(&self) -> String {
        format!("OS keyring ({KEYRING_SERVICE}/{KEYRING_USER})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested/credentials.json"));

        assert!(store.load().unwrap().is_none());

        let creds = TitleCredentials::new("ABCD", "secret").unwrap();
        store.store(&creds).unwrap();
        assert_eq!(store.load().unwrap(), Some(creds));

        store.delete().unwrap();
        assert!(store.load().unwrap().is_none());
        store.delete().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        FileCredentialStore::new(path.clone())
            .store(&TitleCredentials::new("ABCD", "secret").unwrap())
            .unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = FileCredentialStore::new(path).load().unwrap_err();
        assert!(matches!(err, PfmpError::CredentialStore(_)));
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(TitleCredentials::new(" ", "secret").is_err());
        assert!(TitleCredentials::new("ABCD", "").is_err());
        let creds = TitleCredentials::new(" ABCD ", " secret ").unwrap();
        assert_eq!(creds.title_id, "ABCD");
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = TitleCredentials::new("ABCD", "hunter2").unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn backend_parsing() {
        assert_eq!(CredentialBackend::from_arg("Keyring"), Some(CredentialBackend::Keyring));
        assert_eq!(CredentialBackend::from_arg("file"), Some(CredentialBackend::File));
        assert_eq!(CredentialBackend::from_arg("vault"), None);
    }
}
