//! `pfmp build`: create, list and remove builds.

use crate::cli::args::{BuildCommand, BuildCreateArgs, BuildListArgs};
use crate::cli::context::CommandContext;
use crate::core::models::{
    ActionResult, BuildSummary, CreateBuildWithManagedContainerRequest, GetBuildResponse,
    Metadata,
};
use crate::core::selector::{BuildListSelector, builds_matching};
use crate::error::Result;

/// Execute a build subcommand.
///
/// # Errors
/// Returns selector validation errors before any remote call, then API errors.
pub async fn execute(command: &BuildCommand, ctx: &CommandContext) -> Result<()> {
    match command {
        BuildCommand::Create(args) => create(args, ctx).await,
        BuildCommand::List(args) => list(args, ctx).await,
        BuildCommand::Remove { build_id } => {
            let mut client = ctx.client()?;
            client.delete_build(build_id).await?;
            tracing::info!(build_id, "Build deleted.");
            ctx.emit("build remove", &ActionResult::new("Deleted build", build_id))
        }
    }
}

async fn create(args: &BuildCreateArgs, ctx: &CommandContext) -> Result<()> {
    let request = create_request(args);
    let mut client = ctx.client()?;
    let response = client.create_build_with_managed_container(&request).await?;
    tracing::info!(
        build_id = response.build_id.as_deref().unwrap_or_default(),
        build_name = %request.build_name,
        "Build created."
    );
    ctx.emit("build create", &response)
}

fn create_request(args: &BuildCreateArgs) -> CreateBuildWithManagedContainerRequest {
    CreateBuildWithManagedContainerRequest {
        build_name: args.name.clone(),
        container_flavor: args.container_flavor,
        game_asset_references: args.assets.clone(),
        game_certificate_references: args.certificates.clone(),
        metadata: args.metadata.iter().cloned().collect::<Metadata>(),
        multiplayer_server_count_per_vm: args.servers_per_vm,
        ports: args.ports.clone(),
        region_configurations: args.regions.clone(),
        start_multiplayer_server_command: args.start_command.clone(),
        vm_size: args.vm_size.clone(),
    }
}

async fn list(args: &BuildListArgs, ctx: &CommandContext) -> Result<()> {
    let selector = BuildListSelector::from_flags(args.name.clone(), args.id.clone(), args.all)?;
    let mut client = ctx.client()?;

    let summaries: Vec<BuildSummary> = match &selector {
        BuildListSelector::Id(id) => {
            let build = client.get_build(id).await?;
            if args.detailed {
                return ctx.emit("build list", &vec![build]);
            }
            vec![BuildSummary {
                build_id: build.build_id,
                build_name: build.build_name,
                creation_time: build.creation_time,
                metadata: build.metadata,
            }]
        }
        BuildListSelector::Name(name) => {
            let page = client.list_build_summaries(false).await?;
            builds_matching(&page, name).into_iter().cloned().collect()
        }
        BuildListSelector::All => client.list_build_summaries(true).await?,
    };
    tracing::debug!(count = summaries.len(), ?selector, "listed builds");

    if args.detailed {
        let mut detailed: Vec<GetBuildResponse> = Vec::with_capacity(summaries.len());
        for summary in &summaries {
            detailed.push(client.get_build(&summary.build_id).await?);
        }
        ctx.emit("build list", &detailed)
    } else {
        ctx.emit("build list", &summaries)
    }
}
