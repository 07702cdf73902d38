//! Robot-mode output (JSON).
//!
//! Every command wraps its payload in a [`RobotOutput`] envelope so scripts
//! can check `schemaVersion` and `command` before reading `data`.

use serde::Serialize;

use crate::core::models::RobotOutput;
use crate::error::Result;

/// Render any value as compact JSON.
pub fn render_json<T: Serialize>(output: &T) -> Result<String> {
    Ok(serde_json::to_string(output)?)
}

/// Render any value as pretty JSON.
pub fn render_json_pretty<T: Serialize>(output: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(output)?)
}

/// Wrap `data` in the envelope for `command` and serialize it.
pub fn render_envelope<T: Serialize>(command: &str, data: &T, pretty: bool) -> Result<String> {
    let output = RobotOutput::new(command, data);
    if pretty {
        render_json_pretty(&output)
    } else {
        render_json(&output)
    }
}
