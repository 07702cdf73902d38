//! `pfmp certificate`: game certificates.

use std::path::Path;

use crate::cli::args::CertificateCommand;
use crate::cli::context::CommandContext;
use crate::core::files::{read_base64, resolve_existing_file};
use crate::core::models::{ActionResult, Certificate};
use crate::error::Result;

/// Execute a certificate subcommand.
///
/// # Errors
/// A missing certificate file fails before any remote call.
pub async fn execute(command: &CertificateCommand, ctx: &CommandContext) -> Result<()> {
    match command {
        CertificateCommand::Add {
            file,
            name,
            password,
        } => add(ctx, file, name, password.clone()).await,
        CertificateCommand::List { all } => {
            let mut client = ctx.client()?;
            let certificates = client.list_certificate_summaries(*all).await?;
            ctx.emit("certificate list", &certificates)
        }
        CertificateCommand::Remove { name } => {
            let mut client = ctx.client()?;
            client.delete_certificate(name).await?;
            tracing::info!(name, "Certificate removed.");
            ctx.emit(
                "certificate remove",
                &ActionResult::new("Deleted certificate", name),
            )
        }
    }
}

async fn add(
    ctx: &CommandContext,
    file: &Path,
    name: &str,
    password: Option<String>,
) -> Result<()> {
    let path = resolve_existing_file(file)?;
    let certificate = Certificate {
        name: name.to_string(),
        base64_encoded_value: read_base64(&path)?,
        password: password.filter(|p| !p.is_empty()),
    };

    let mut client = ctx.client()?;
    client.upload_certificate(certificate).await?;
    tracing::info!(name, path = %path.display(), "Certificate uploaded.");
    ctx.emit(
        "certificate add",
        &ActionResult::new("Uploaded certificate", name),
    )
}
