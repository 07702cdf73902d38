//! `pfmp image`: container images and tags.

use crate::cli::args::ImageCommand;
use crate::cli::context::CommandContext;
use crate::core::models::{ActionResult, ImageTags};
use crate::error::Result;

/// Execute an image subcommand.
///
/// # Errors
/// Propagates API errors.
pub async fn execute(command: &ImageCommand, ctx: &CommandContext) -> Result<()> {
    let mut client = ctx.client()?;
    match command {
        ImageCommand::List { all } => {
            let images = client.list_container_images(*all).await?;
            ctx.emit("image list", &images)
        }
        ImageCommand::Tags { image_name } => {
            let tags = client.list_container_image_tags(image_name).await?;
            ctx.emit(
                "image tags",
                &ImageTags {
                    image_name: image_name.clone(),
                    tags,
                },
            )
        }
        ImageCommand::Untag { image_name, tag } => {
            client.untag_container_image(image_name, tag).await?;
            tracing::info!(image_name, tag, "Tag removed.");
            ctx.emit(
                "image untag",
                &ActionResult::new("Removed tag", format!("{image_name}:{tag}")),
            )
        }
    }
}
