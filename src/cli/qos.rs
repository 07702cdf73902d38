//! `pfmp qos`: quality-of-service endpoints.

use crate::cli::args::QosCommand;
use crate::cli::context::CommandContext;
use crate::error::Result;

/// Execute a QoS subcommand.
///
/// # Errors
/// Propagates API errors.
pub async fn execute(command: &QosCommand, ctx: &CommandContext) -> Result<()> {
    match command {
        QosCommand::List => {
            let mut client = ctx.client()?;
            let servers = client.list_qos_servers().await?;
            ctx.emit("qos list", &servers)
        }
    }
}
