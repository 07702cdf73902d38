//! pfmp - multiplayer server management CLI
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use pfmp::cli::{Cli, CommandContext, OutputFormat};
use pfmp::core::logging;
use pfmp::error::PfmpError;
use pfmp::storage::{AppPaths, ResolvedConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = logging::effective_level(cli.log_level.as_deref(), cli.verbose);
    let log_format = if cli.json_output {
        logging::LogFormat::Json
    } else {
        logging::parse_log_format_from_env().unwrap_or_default()
    };
    logging::init(log_level, log_format, logging::parse_log_file_from_env());

    let Some(command) = &cli.command else {
        print_quickstart();
        return ExitCode::SUCCESS;
    };

    let config = match ResolvedConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            return fail(
                &e,
                cli.cli_format().unwrap_or_default(),
                cli.no_color,
                cli.pretty,
            );
        }
    };
    tracing::debug!(
        config = %config.config_path.display(),
        format = %config.sources.format,
        timeout = %config.sources.timeout,
        url = %config.sources.production_environment_url,
        "resolved configuration"
    );
    pfmp::util::env::apply_color_choice(config.no_color);

    let (format, no_color, pretty) = (config.format, config.no_color, config.pretty);
    let ctx = CommandContext::new(config, AppPaths::new());

    match pfmp::cli::dispatch(command, &ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e, format, no_color, pretty),
    }
}

fn fail(error: &PfmpError, format: OutputFormat, no_color: bool, pretty: bool) -> ExitCode {
    tracing::error!("{}", error);
    let error_output = pfmp::render::error::render_error_full(error, format, no_color, pretty);
    eprintln!("{error_output}");
    ExitCode::from(error.exit_code() as u8)
}

fn print_quickstart() {
    println!(
        "pfmp {}\n\n\
         Quick start:\n  \
         pfmp title set --title-id <TITLE_ID> --secret-key <SECRET_KEY>\n  \
         pfmp asset add --file server.zip\n  \
         pfmp build list --all\n  \
         pfmp server list --build-name <NAME> --all-regions\n\n\
         Run `pfmp --help` for every command.",
        env!("CARGO_PKG_VERSION")
    );
}
