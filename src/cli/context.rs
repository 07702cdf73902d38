//! Shared state for command execution.
//!
//! Every remote command goes through [`CommandContext::client`], which
//! performs the title-configured check before anything touches the network.

use serde::Serialize;

use crate::core::api::{ApiClient, base_url_for};
use crate::core::blob::BlobUploader;
use crate::core::http::build_client;
use crate::core::models::CredentialOrigin;
use crate::error::{PfmpError, Result};
use crate::render::{self, HumanRender};
use crate::storage::{
    AppPaths, CredentialStore, ResolvedConfig, TitleCredentials, TokenCacheFile, open_store,
};

/// Resolved configuration plus the locations of persisted state.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: ResolvedConfig,
    pub paths: AppPaths,
}

impl CommandContext {
    #[must_use]
    pub const fn new(config: ResolvedConfig, paths: AppPaths) -> Self {
        Self { config, paths }
    }

    /// The configured credential store.
    ///
    /// # Errors
    /// Returns `CredentialStore` if the backend cannot be opened.
    pub fn store(&self) -> Result<Box<dyn CredentialStore>> {
        open_store(self.config.credential_store, self.paths.credentials_file())
    }

    #[must_use]
    pub fn token_file(&self) -> TokenCacheFile {
        TokenCacheFile::new(self.paths.token_cache_file())
    }

    /// Active title credentials: the environment first, then the store.
    ///
    /// # Errors
    /// Returns `TitleNotConfigured` if neither has credentials, or the
    /// store's error if it cannot be read.
    pub fn credentials(&self) -> Result<(TitleCredentials, CredentialOrigin)> {
        if let Some(credentials) = TitleCredentials::from_env() {
            tracing::debug!(title_id = %credentials.title_id, "using credentials from environment");
            return Ok((credentials, CredentialOrigin::Environment));
        }
        match self.store()?.load()? {
            Some(credentials) => Ok((credentials, CredentialOrigin::Store)),
            None => Err(PfmpError::TitleNotConfigured),
        }
    }

    #[must_use]
    pub fn base_url(&self, title_id: &str) -> String {
        base_url_for(title_id, &self.config.production_environment_url)
    }

    /// Client for the configured title.
    ///
    /// # Errors
    /// Returns `TitleNotConfigured` when no title is set up.
    pub fn client(&self) -> Result<ApiClient> {
        let (credentials, _) = self.credentials()?;
        self.client_for(credentials)
    }

    /// Client for explicit credentials, sharing the persisted token cache.
    ///
    /// # Errors
    /// Returns `Network` if the HTTP client cannot be built.
    pub fn client_for(&self, credentials: TitleCredentials) -> Result<ApiClient> {
        let http = build_client(self.config.timeout)?;
        let base_url = self.base_url(&credentials.title_id);
        Ok(ApiClient::new(http, base_url, credentials, self.config.timeout)
            .with_token_file(self.token_file())
            .with_page_size(self.config.page_size))
    }

    /// Uploader for blob storage, using the upload settings.
    ///
    /// # Errors
    /// Returns `Network` if the HTTP client cannot be built.
    pub fn uploader(&self) -> Result<BlobUploader> {
        let http = build_client(self.config.upload.timeout)?;
        Ok(BlobUploader::new(http, self.config.upload))
    }

    /// Render `data` in the configured format and print it to stdout.
    ///
    /// # Errors
    /// Returns `Json` if serialization fails.
    pub fn emit<T>(&self, command: &str, data: &T) -> Result<()>
    where
        T: Serialize + HumanRender,
    {
        let output = render::render(
            command,
            data,
            self.config.format,
            self.config.pretty,
            self.config.no_color,
        )?;
        print!("{output}");
        if !output.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
