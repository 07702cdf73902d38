//! `pfmp asset`: game server packages.

use std::path::Path;

use crate::cli::args::AssetCommand;
use crate::cli::context::CommandContext;
use crate::core::files::{asset_name_for, resolve_existing_file};
use crate::core::models::{ActionResult, AssetUploadResult, Metadata};
use crate::error::Result;

/// Execute an asset subcommand.
///
/// # Errors
/// Local file and name checks fail before any remote call.
pub async fn execute(command: &AssetCommand, ctx: &CommandContext) -> Result<()> {
    match command {
        AssetCommand::Add {
            file,
            asset_name,
            metadata,
        } => {
            let metadata: Metadata = metadata.iter().cloned().collect();
            add(ctx, file, asset_name.as_deref(), metadata).await
        }
        AssetCommand::List { all } => {
            let mut client = ctx.client()?;
            let assets = client.list_asset_summaries(*all).await?;
            ctx.emit("asset list", &assets)
        }
        AssetCommand::Remove { file_name } => {
            let mut client = ctx.client()?;
            client.delete_asset(file_name).await?;
            tracing::info!(file_name, "Asset removed.");
            ctx.emit("asset remove", &ActionResult::new("Deleted asset", file_name))
        }
    }
}

async fn add(
    ctx: &CommandContext,
    file: &Path,
    asset_name: Option<&str>,
    metadata: Metadata,
) -> Result<()> {
    let path = resolve_existing_file(file)?;
    let asset_name = asset_name_for(&path, asset_name)?;

    let mut client = ctx.client()?;
    let upload = client.get_asset_upload_url(&asset_name).await?;

    tracing::info!(asset_name, path = %path.display(), "Uploading asset.");
    let report = ctx
        .uploader()?
        .upload_file(&upload.asset_upload_url, &path, &metadata)
        .await?;
    tracing::info!(asset_name, bytes = report.bytes, blocks = report.blocks, "Asset upload complete.");

    ctx.emit(
        "asset add",
        &AssetUploadResult {
            asset_name,
            bytes: report.bytes,
            blocks: report.blocks,
            metadata,
        },
    )
}
