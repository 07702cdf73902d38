//! Error rendering for pfmp.
//!
//! Provides colored error rendering with fix suggestions for terminal output,
//! simple text for non-TTY environments, and structured JSON for `--json`.

use colored::Colorize;

use crate::cli::args::OutputFormat;
use crate::error::{FixSuggestion, PfmpError};

// =============================================================================
// Public API
// =============================================================================

/// Render an error, choosing colored or plain text from the terminal state.
#[must_use]
pub fn render_error(error: &PfmpError, format: OutputFormat, no_color: bool) -> String {
    render_error_full(error, format, no_color, false)
}

/// Render an error with full control over all formatting options.
///
/// JSON format always produces a structured document. Human format uses
/// colors only when allowed and stderr is a terminal.
#[must_use]
pub fn render_error_full(
    error: &PfmpError,
    format: OutputFormat,
    no_color: bool,
    pretty: bool,
) -> String {
    if format == OutputFormat::Json {
        return render_error_json(error, pretty);
    }

    let use_color = crate::util::env::should_use_color_for(
        no_color,
        crate::util::env::stderr_is_tty(),
    );
    if use_color {
        render_colored(error)
    } else {
        render_simple(error)
    }
}

/// Render error as structured JSON for machine consumption.
#[must_use]
pub fn render_error_json(error: &PfmpError, pretty: bool) -> String {
    let error_json = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&error_json)
    } else {
        serde_json::to_string(&error_json)
    };
    rendered.unwrap_or_else(|_| render_simple(error))
}

// =============================================================================
// Colored Terminal Rendering
// =============================================================================

fn render_colored(error: &PfmpError) -> String {
    let suggestions = error.fix_suggestions();
    let mut lines = vec![format!(
        "{} {}",
        error.to_string().red().bold(),
        format!("[{}]", error.error_code()).dimmed()
    )];

    let commands = suggestion_commands(&suggestions);
    if !commands.is_empty() {
        lines.push(String::new());
        lines.push("How to fix:".cyan().bold().to_string());
        for (i, cmd) in commands.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, cmd.cyan()));
        }
    }

    if let Some(first) = suggestions.first() {
        if !first.context.is_empty() {
            lines.push(String::new());
            lines.push("Why this happened:".yellow().bold().to_string());
            lines.extend(wrap_text(&first.context, 68).into_iter().map(|l| format!("  {l}")));
        }
        if let Some(prevention) = &first.prevention {
            lines.push(String::new());
            lines.push("Prevention:".green().bold().to_string());
            lines.extend(wrap_text(prevention, 68).into_iter().map(|l| format!("  {l}")));
        }
    }

    lines.join("\n")
}

fn suggestion_commands(suggestions: &[FixSuggestion]) -> Vec<&str> {
    suggestions
        .iter()
        .flat_map(|s| s.commands.iter().map(String::as_str))
        .filter(|cmd| !cmd.starts_with('#'))
        .collect()
}

// =============================================================================
// Simple Text Rendering
// =============================================================================

/// Render error as simple text (no ANSI codes).
fn render_simple(error: &PfmpError) -> String {
    let suggestions = error.fix_suggestions();
    let mut lines = vec![format!("Error [{}]: {}", error.error_code(), error)];
    if let Some(cmd) = suggestion_commands(&suggestions).first() {
        lines.push(format!("Fix: {cmd}"));
    }
    lines.join("\n")
}

// =============================================================================
// JSON Rendering
// =============================================================================

/// JSON representation of an error for machine consumption.
#[derive(serde::Serialize)]
struct ErrorJson {
    error_code: String,
    category: String,
    message: String,
    is_retryable: bool,
    exit_code: i32,
    suggestions: Vec<SuggestionJson>,
}

#[derive(serde::Serialize)]
struct SuggestionJson {
    commands: Vec<String>,
    context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prevention: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &PfmpError) -> Self {
        Self {
            error_code: error.error_code().to_string(),
            category: error.category().to_string(),
            message: error.to_string(),
            is_retryable: error.is_retryable(),
            exit_code: error.exit_code().into(),
            suggestions: error
                .fix_suggestions()
                .into_iter()
                .map(|s| SuggestionJson {
                    commands: s.commands,
                    context: s.context,
                    prevention: s.prevention,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// =============================================================================
// Tests
// =============================================================================
