//! `pfmp title`: credentials and the entity token.

use chrono::Utc;

use crate::cli::args::TitleCommand;
use crate::cli::context::CommandContext;
use crate::core::models::{ActionResult, CredentialOrigin, TitleStatus, TokenStatus};
use crate::core::token::{CachedToken, Freshness};
use crate::error::{PfmpError, Result};
use crate::storage::TitleCredentials;

/// Execute a title subcommand.
///
/// # Errors
/// Propagates credential store and token endpoint errors.
pub async fn execute(command: &TitleCommand, ctx: &CommandContext) -> Result<()> {
    match command {
        TitleCommand::Set {
            title_id,
            secret_key,
        } => set(ctx, title_id, secret_key).await,
        TitleCommand::Token { force } => token(ctx, *force).await,
        TitleCommand::Show => show(ctx),
        TitleCommand::Clear => clear(ctx),
    }
}

async fn set(ctx: &CommandContext, title_id: &str, secret_key: &str) -> Result<()> {
    let credentials = TitleCredentials::new(title_id, secret_key)?;
    let store = ctx.store()?;
    store.store(&credentials)?;
    tracing::info!(title_id = %credentials.title_id, store = %store.describe(), "stored title credentials");

    let mut client = ctx.client_for(credentials.clone())?;
    let token = client.refresh_token().await?;

    let status = TitleStatus {
        title_id: credentials.title_id,
        origin: CredentialOrigin::Store,
        base_url: client.base_url().to_string(),
        store: store.describe(),
        token: Some(token_status(&token, true)),
    };
    ctx.emit("title set", &status)
}

async fn token(ctx: &CommandContext, force: bool) -> Result<()> {
    let (credentials, origin) = ctx.credentials()?;
    let mut client = ctx.client_for(credentials)?;

    let status = if force {
        token_status(&client.refresh_token().await?, true)
    } else {
        let before = client.cached_token().map(|t| t.refresh_at);
        client.entity_token().await?;
        let token = client.cached_token().cloned().ok_or_else(|| {
            PfmpError::Other(anyhow::anyhow!("token cache empty after retrieval"))
        })?;
        token_status(&token, before != Some(token.refresh_at))
    };

    let status = TitleStatus {
        title_id: client.credentials().title_id.clone(),
        origin,
        base_url: client.base_url().to_string(),
        store: ctx.store()?.describe(),
        token: Some(status),
    };
    ctx.emit("title token", &status)
}

fn show(ctx: &CommandContext) -> Result<()> {
    let (credentials, origin) = ctx.credentials()?;
    let cache = ctx.token_file().load();
    let token = match cache.freshness(&credentials.title_id, Utc::now()) {
        Freshness::TitleChanged | Freshness::Empty => None,
        freshness => cache.token().map(|t| TokenStatus {
            fresh: freshness == Freshness::Fresh,
            ..token_status(t, false)
        }),
    };

    let status = TitleStatus {
        base_url: ctx.base_url(&credentials.title_id),
        title_id: credentials.title_id,
        origin,
        store: ctx.store()?.describe(),
        token,
    };
    ctx.emit("title show", &status)
}

fn clear(ctx: &CommandContext) -> Result<()> {
    let store = ctx.store()?;
    store.delete()?;
    ctx.token_file().clear()?;
    tracing::info!(store = %store.describe(), "removed title credentials and token cache");
    ctx.emit(
        "title clear",
        &ActionResult::new("Removed credentials from", store.describe()),
    )
}

fn token_status(token: &CachedToken, refreshed: bool) -> TokenStatus {
    TokenStatus {
        refresh_at: token.refresh_at,
        server_expiration: token.server_expiration,
        fresh: true,
        refreshed,
    }
}
