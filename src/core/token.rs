//! Entity token cache.
//!
//! A token is reused until a fixed refresh interval has elapsed or the
//! title changes. The server-reported expiration is recorded for display
//! but does not drive refresh.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Interval after which a fetched token is considered stale.
pub const TOKEN_REFRESH_INTERVAL_HOURS: i64 = 12;

/// A fetched entity token.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CachedToken {
    pub title_id: String,
    pub entity_token: String,
    /// Local refresh deadline.
    pub refresh_at: DateTime<Utc>,
    /// Expiration reported by the backend, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_expiration: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("title_id", &self.title_id)
            .field("entity_token", &"<redacted>")
            .field("refresh_at", &self.refresh_at)
            .field("server_expiration", &self.server_expiration)
            .finish()
    }
}

/// Token returned by a fetch, before it is stamped with a refresh deadline.
#[derive(Debug, Clone)]
pub struct FetchedToken {
    pub entity_token: String,
    pub server_expiration: Option<DateTime<Utc>>,
}

/// Why a refresh is (or is not) needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Cached token can be reused.
    Fresh,
    /// Nothing cached.
    Empty,
    /// Refresh deadline has passed.
    Expired,
    /// Cached token belongs to another title.
    TitleChanged,
}

/// Time-boxed entity token cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCache {
    #[serde(default)]
    token: Option<CachedToken>,
}

impl TokenCache {
    #[must_use]
    pub const fn new() -> Self {
        Self { token: None }
    }

    #[must_use]
    pub const fn from_token(token: CachedToken) -> Self {
        Self { token: Some(token) }
    }

    /// Currently cached token, stale or not.
    #[must_use]
    pub const fn token(&self) -> Option<&CachedToken> {
        self.token.as_ref()
    }

    /// Drop the cached token so the next `ensure_token` refreshes.
    pub fn reset(&mut self) {
        self.token = None;
    }

    /// Classify the cached token for `title_id` at `now`.
    #[must_use]
    pub fn freshness(&self, title_id: &str, now: DateTime<Utc>) -> Freshness {
        match &self.token {
            None => Freshness::Empty,
            Some(token) if token.title_id != title_id => Freshness::TitleChanged,
            Some(token) if now >= token.refresh_at => Freshness::Expired,
            Some(_) => Freshness::Fresh,
        }
    }

    /// Return a usable token for `title_id`, fetching a new one if needed.
    ///
    /// Returns the token and whether a fetch happened.
    ///
    /// # Errors
    /// Propagates the fetch error; the cache is left empty in that case.
    pub async fn ensure_token<F, Fut>(
        &mut self,
        title_id: &str,
        fetch: F,
    ) -> Result<(String, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchedToken>>,
    {
        self.ensure_token_at(title_id, Utc::now(), fetch).await
    }

    /// [`Self::ensure_token`] with an explicit clock.
    ///
    /// # Errors
    /// Propagates the fetch error; the cache is left empty in that case.
    pub async fn ensure_token_at<F, Fut>(
        &mut self,
        title_id: &str,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<(String, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchedToken>>,
    {
        let freshness = self.freshness(title_id, now);
        if freshness == Freshness::Fresh {
            if let Some(token) = &self.token {
                return Ok((token.entity_token.clone(), false));
            }
        }

        tracing::debug!(title_id, ?freshness, "refreshing entity token");
        self.token = None;

        let fetched = fetch().await?;
        let token = CachedToken {
            title_id: title_id.to_string(),
            entity_token: fetched.entity_token,
            refresh_at: now + Duration::hours(TOKEN_REFRESH_INTERVAL_HOURS),
            server_expiration: fetched.server_expiration,
        };
        let value = token.entity_token.clone();
        self.token = Some(token);
        tracing::info!(title_id, "Entity token retrieved.");
        Ok((value, true))
    }
}
