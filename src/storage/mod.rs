//! Storage for configuration, title credentials and the entity token cache.

pub mod config;
pub mod credentials;
pub mod paths;
pub mod token_cache;

pub use config::{
    Config, ConfigSource, ConfigSources, ENV_CONFIG, ENV_FORMAT, ENV_NO_COLOR, ENV_NO_COLOR_STD,
    ENV_PAGE_SIZE, ENV_PRETTY, ENV_PRODUCTION_URL, ENV_TIMEOUT, ResolvedConfig,
};
pub use credentials::{
    CredentialBackend, CredentialStore, FileCredentialStore, KeyringCredentialStore,
    TitleCredentials, open_store,
};
pub use paths::AppPaths;
pub use token_cache::TokenCacheFile;
