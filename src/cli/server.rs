//! `pfmp server`: game server sessions and title enablement.

use std::time::{Duration, Instant};

use crate::cli::args::{
    OutputFormat, ServerCommand, ServerEnableArgs, ServerListArgs, ServerRequestArgs,
};
use crate::cli::context::CommandContext;
use crate::core::api::ApiClient;
use crate::core::models::{
    EnableResult, MultiplayerServerSummary, RequestMultiplayerServerRequest,
    TitleMultiplayerServerEnabledStatus,
};
use crate::core::selector::{BuildRef, RegionSelection, build_regions};
use crate::error::{PfmpError, Result};

/// Execute a server subcommand.
///
/// # Errors
/// Selector errors come before any remote call; name lookups and API calls
/// fail with their own errors.
pub async fn execute(command: &ServerCommand, ctx: &CommandContext) -> Result<()> {
    match command {
        ServerCommand::Request(args) => request(args, ctx).await,
        ServerCommand::List(args) => list(args, ctx).await,
        ServerCommand::Enable(args) => enable(args, ctx).await,
    }
}

async fn request(args: &ServerRequestArgs, ctx: &CommandContext) -> Result<()> {
    let build = BuildRef::from_flags(args.build.build_name.clone(), args.build.build_id.clone())?;
    let mut client = ctx.client()?;
    let build_id = build.resolve(&mut client).await?;

    let request = RequestMultiplayerServerRequest {
        build_id,
        preferred_regions: args.preferred_regions.clone(),
        session_cookie: args.session_cookie.clone(),
        session_id: args.session_id.to_string(),
    };
    let response = client.request_multiplayer_server(&request).await?;
    tracing::info!(
        build_id = %request.build_id,
        session_id = %request.session_id,
        server_id = response.server_id.as_deref().unwrap_or_default(),
        "Server allocated."
    );
    ctx.emit("server request", &response)
}

async fn list(args: &ServerListArgs, ctx: &CommandContext) -> Result<()> {
    let build = BuildRef::from_flags(args.build.build_name.clone(), args.build.build_id.clone())?;
    let selection = RegionSelection::from_flags(args.regions.clone(), args.all_regions)?;
    let mut client = ctx.client()?;
    let build_id = build.resolve(&mut client).await?;

    let regions = match selection {
        RegionSelection::Regions(regions) => regions,
        RegionSelection::AllRegions => build_regions(&client.get_build(&build_id).await?),
    };

    let mut servers: Vec<MultiplayerServerSummary> = Vec::new();
    for region in regions {
        let page = client
            .list_multiplayer_servers(&build_id, region, args.all)
            .await?;
        tracing::debug!(%region, count = page.len(), "listed servers");
        servers.extend(page);
    }
    ctx.emit("server list", &servers)
}

async fn enable(args: &ServerEnableArgs, ctx: &CommandContext) -> Result<()> {
    let mut client = ctx.client()?;
    client.enable_multiplayer_servers_for_title().await?;

    let interval = Duration::from_secs(args.poll_interval);
    let started = Instant::now();
    let mut status = current_status(&mut client).await?;

    while status != TitleMultiplayerServerEnabledStatus::Enabled {
        if let Some(max_wait) = args.max_wait {
            if started.elapsed().as_secs() >= max_wait {
                return Err(PfmpError::WaitExceeded {
                    what: format!("title multiplayer servers are still {status}"),
                    seconds: max_wait,
                });
            }
        }
        tokio::time::sleep(interval).await;

        let elapsed = started.elapsed().as_secs();
        tracing::info!(elapsed, %status, "Querying status...");
        if ctx.config.format == OutputFormat::Human {
            eprintln!("Querying status... Elapsed seconds: {elapsed}");
        }
        status = current_status(&mut client).await?;
    }

    tracing::info!("Title is enabled for multiplayer servers.");
    ctx.emit(
        "server enable",
        &EnableResult {
            status,
            elapsed_seconds: started.elapsed().as_secs(),
        },
    )
}

async fn current_status(client: &mut ApiClient) -> Result<TitleMultiplayerServerEnabledStatus> {
    client.title_enabled_status().await?.status.ok_or_else(|| {
        PfmpError::ParseResponse(
            "GetTitleEnabledForMultiplayerServersStatus: missing Status".to_string(),
        )
    })
}
