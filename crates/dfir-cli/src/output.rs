//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or
//! stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. user config `output`
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use dfir_core::error::{ErrorCode, FirError};
use serde::Serialize;
use std::fmt;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, timelines, visual framing).
    Pretty,
    /// Plain text rows for pipes and scripts.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    user_output: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    if let Some(mode) = format_env.and_then(OutputMode::parse_loose) {
        return mode;
    }

    if let Some(mode) = user_output.and_then(OutputMode::parse_loose) {
        return mode;
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, user config and TTY
/// defaults.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    user_output: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(
        format_flag,
        json_flag,
        env_val.as_deref(),
        user_output,
        is_tty,
    )
}

/// Trait implemented by list rows that render in all modes.
pub trait Renderable {
    /// Render for human consumption.
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a self-contained JSON object.
    fn render_json(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a single text row, columns as in [`table_headers`].
    ///
    /// [`table_headers`]: Renderable::table_headers
    fn render_table(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Column headers for text mode.
    fn table_headers() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }
}

/// Render a list of [`Renderable`] items to stdout.
///
/// - In JSON mode, wraps items in a JSON array.
/// - In pretty/text mode, renders items sequentially.
pub fn render_list<R: Renderable>(items: &[R], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_list(items, mode, &mut out)
}

fn write_list<R: Renderable>(items: &[R], mode: OutputMode, out: &mut dyn Write) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => {
            for item in items {
                item.render_human(out)?;
            }
        }
        OutputMode::Text => {
            let headers = if items.is_empty() {
                &[] as &[&str]
            } else {
                R::table_headers()
            };
            if !headers.is_empty() {
                writeln!(out, "{}", headers.join("  "))?;
            }
            for item in items {
                item.render_table(out)?;
            }
        }
        OutputMode::Json => {
            write!(out, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ",")?;
                }
                writeln!(out)?;
                let mut buf = Vec::new();
                item.render_json(&mut buf)?;
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                out.write_all(&buf)?;
            }
            writeln!(out, "\n]")?;
        }
    }
    Ok(())
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render a serializable value to stdout in the requested format.
///
/// Pretty and text share `human_fn`. For distinct text/pretty rendering,
/// use [`render_mode`].
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Error for a well-known [`ErrorCode`] with its standard hint.
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

impl From<&FirError> for CliError {
    fn from(err: &FirError) -> Self {
        let suggestion = err.suggestion();
        Self {
            message: err.to_string(),
            suggestion: (!suggestion.is_empty()).then_some(suggestion),
            error_code: Some(err.code().code().to_string()),
        }
    }
}

/// Marker for a failure whose [`CliError`] is already on stderr. `main`
/// exits non-zero without printing it again.
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error already reported")
    }
}

impl std::error::Error for Reported {}

/// Render `error` and return the [`Reported`] marker for the caller to
/// propagate.
pub fn report(mode: OutputMode, error: &CliError) -> anyhow::Error {
    match render_error(mode, error) {
        Ok(()) => anyhow::Error::new(Reported),
        Err(render_err) => render_err,
    }
}

/// Whether `err` still needs rendering before the process exits.
pub fn is_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Reported>().is_some()
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(mode, error, &mut out)
}

fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
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
