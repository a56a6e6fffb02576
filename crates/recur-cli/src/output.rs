//! Shared output layer for pretty/text/JSON parity across all CLI
//! commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its
//! output accordingly: pretty output for humans, compact text for pipes,
//! or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY;
//!    [`OutputMode::Text`] if piped.

use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shared width for pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-optimized output (tables, sections, visual framing).
    Pretty,
    /// Token-efficient plain text for pipes and scripts.
    Text,
    /// Machine-readable JSON (one object per result, or a JSON array).
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    if let Some(val) = format_env {
        match val.to_lowercase().as_str() {
            "json" => return OutputMode::Json,
            "text" => return OutputMode::Text,
            "pretty" => return OutputMode::Pretty,
            _ => {} // unknown value — fall through to TTY detection
        }
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, and TTY defaults.
pub fn resolve_output_mode(json_flag: bool) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(json_flag, env_val.as_deref(), is_tty)
}

/// Structured CLI error surfaced on stderr (and as JSON when requested).
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. `E2004`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Create an error with a suggestion and machine code.
    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(code.into()),
        }
    }

    /// Build from the core error taxonomy, carrying its machine code and
    /// hint.
    pub fn from_core(error: &recur_core::CoreError) -> Self {
        let code = error.error_code();
        Self {
            message: error.to_string(),
            suggestion: code.hint().map(ToString::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Render an error to stderr in the requested mode.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render a success message (or a JSON `ok` envelope).
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "ok": true,
                "message": message,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "✓ {message}")?;
        }
    }
    Ok(())
}

/// Render any serializable value as pretty JSON on stdout.
pub fn render_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CliError, OutputMode, resolve_output_mode_inner};

    #[test]
    fn json_flag_wins_over_env_and_tty() {
        let mode = resolve_output_mode_inner(true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn env_var_wins_over_tty_default() {
        assert_eq!(
            resolve_output_mode_inner(false, Some("json"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode_inner(false, Some("text"), true),
            OutputMode::Text
        );
    }

    #[test]
    fn unknown_env_value_falls_back_to_tty_detection() {
        assert_eq!(
            resolve_output_mode_inner(false, Some("fancy"), true),
            OutputMode::Pretty
        );
        assert_eq!(
            resolve_output_mode_inner(false, Some("fancy"), false),
            OutputMode::Text
        );
    }

    #[test]
    fn core_errors_carry_machine_codes() {
        let error = recur_core::CoreError::InvalidState("nope".to_string());
        let cli = CliError::from_core(&error);
        assert_eq!(cli.error_code.as_deref(), Some("E2006"));
        assert!(cli.message.contains("invalid state"));
    }

    #[test]
    fn serialized_error_omits_empty_fields() {
        let json = serde_json::to_value(CliError::new("boom")).unwrap();
        assert_eq!(json["message"], "boom");
        assert!(json.get("suggestion").is_none());
        assert!(json.get("error_code").is_none());
    }
}
