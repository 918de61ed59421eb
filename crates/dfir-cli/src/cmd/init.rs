use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use dfir_core::config::{self, DFIR_DIR};
use dfir_core::error::ErrorCode;
use dfir_core::snapshot;

use crate::output::{CliError, OutputMode, render, report};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite `.dfir/config.toml` even if `.dfir/` already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitOutput {
    config: String,
    cases: String,
    /// False when an existing case snapshot was left in place.
    cases_created: bool,
}

/// Execute `dfir init`. Creates the project skeleton:
///
/// ```text
/// .dfir/
///   config.toml   (default project config)
///   cases.json    (empty case snapshot)
/// ```
///
/// An existing `cases.json` is never overwritten, even with `--force`.
///
/// # Errors
///
/// Returns an error if `.dfir/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let dfir_dir = project_root.join(DFIR_DIR);

    if dfir_dir.exists() && !args.force {
        return Err(report(
            output,
            &CliError::from_code(ErrorCode::AlreadyInitialized, ".dfir/ already exists"),
        ));
    }

    std::fs::create_dir_all(&dfir_dir)
        .with_context(|| format!("Failed to create {}", dfir_dir.display()))?;

    let config_path = config::config_path(project_root);
    std::fs::write(&config_path, config::default_config_toml()?)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let cases_path = snapshot::snapshot_path(project_root);
    let cases_created = !cases_path.exists();
    if cases_created {
        snapshot::write_snapshot(&cases_path, &[])?;
    }

    tracing::info!(root = %project_root.display(), "project initialized");

    let result = InitOutput {
        config: config_path.display().to_string(),
        cases: cases_path.display().to_string(),
        cases_created,
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ Initialized .dfir/ project structure.")?;
        writeln!(w)?;
        writeln!(w, "  Config: {}", r.config)?;
        writeln!(w, "  Cases:  {}", r.cases)?;
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  File your first report:")?;
        writeln!(
            w,
            "    dfir file --name \"Raj Kumar\" --identity 1234-5678-9012 --category theft ..."
        )
    })
}
