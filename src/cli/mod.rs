//! CLI argument parsing and command dispatch.

pub mod args;
pub mod asset;
pub mod build;
pub mod certificate;
pub mod context;
pub mod image;
pub mod qos;
pub mod server;
pub mod title;

use std::io;

use clap::CommandFactory;
use clap_complete::Shell;

pub use args::{Cli, Commands, OutputFormat};
pub use context::CommandContext;

use crate::error::Result;

/// Run one parsed command.
///
/// # Errors
/// Returns the command's error; the caller renders it and picks the exit code.
pub async fn dispatch(command: &Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Title(cmd) => title::execute(cmd, ctx).await,
        Commands::Build(cmd) => build::execute(cmd, ctx).await,
        Commands::Asset(cmd) => asset::execute(cmd, ctx).await,
        Commands::Certificate(cmd) => certificate::execute(cmd, ctx).await,
        Commands::Image(cmd) => image::execute(cmd, ctx).await,
        Commands::Server(cmd) => server::execute(cmd, ctx).await,
        Commands::Qos(cmd) => qos::execute(cmd, ctx).await,
        Commands::Completions { shell } => {
            print_completions(*shell);
            Ok(())
        }
    }
}

/// Write the completion script for `shell` to stdout.
pub fn print_completions(shell: Shell) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
}
