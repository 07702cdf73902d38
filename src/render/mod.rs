//! Output rendering for human and robot modes.

pub mod error;
pub mod human;
pub mod robot;

use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::Result;
pub use human::{HumanRender, Table};

/// Render a command result in the requested format.
///
/// `command` names the subcommand in the JSON envelope, e.g. `"build list"`.
pub fn render<T>(
    command: &str,
    data: &T,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String>
where
    T: Serialize + HumanRender,
{
    match format {
        OutputFormat::Human => Ok(data.render_human(crate::util::env::should_use_color(no_color))),
        OutputFormat::Json => robot::render_envelope(command, data, pretty),
    }
}
