//! Offline identity helpers: `dfir fingerprint` and `dfir validate-id`.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;

use dfir_core::error::FirError;
use dfir_core::fingerprint::fingerprint;
use dfir_core::validate::{self, mask_identity};

use crate::output::{CliError, OutputMode, render, report};

#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Raw identifier to fingerprint.
    pub raw: String,
}

#[derive(Args, Debug)]
pub struct ValidateIdArgs {
    /// Identity number to check (12 digits, optionally grouped 4-4-4).
    pub raw: String,
}

#[derive(Debug, Serialize)]
struct FingerprintOutput {
    fingerprint: String,
}

#[derive(Debug, Serialize)]
struct ValidateIdOutput {
    valid: bool,
    masked: String,
}

pub fn run_fingerprint(args: &FingerprintArgs, output: OutputMode) -> Result<()> {
    let result = FingerprintOutput {
        fingerprint: fingerprint(&args.raw),
    };
    render(output, &result, |r, w| writeln!(w, "{}", r.fingerprint))
}

/// Exits non-zero when the number is malformed.
pub fn run_validate_id(args: &ValidateIdArgs, output: OutputMode) -> Result<()> {
    if let Err(e) = validate::validate_identity_number(&args.raw) {
        return Err(report(output, &CliError::from(&FirError::from(e))));
    }

    let result = ValidateIdOutput {
        valid: true,
        masked: mask_identity(args.raw.trim()),
    };
    render(output, &result, |r, w| writeln!(w, "✓ valid ({})", r.masked))
}
