//! `dfir file`: file a new report from the connected wallet.

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use dfir_core::error::FirError;
use dfir_core::evidence::{EvidenceStore, ensure_within_limit};
use dfir_core::model::case::{Category, Stage};
use dfir_core::pages::file_report::file_too_large;
use dfir_core::pages::{FileReportPage, Notice};
use dfir_core::validate;

use super::{Session, fail};
use crate::cmd::status::evidence_url;
use crate::output::{CliError, OutputMode, pretty_kv, render, report};

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Complainant's full name.
    #[arg(long)]
    pub name: String,

    /// 12-digit Aadhar number (XXXX-XXXX-XXXX). Only its fingerprint is stored.
    #[arg(long, value_name = "NUMBER")]
    pub identity: String,

    /// Complainant's address.
    #[arg(long)]
    pub address: String,

    /// Complaint type, e.g. theft, fraud, property-dispute.
    #[arg(long)]
    pub category: String,

    /// Incident date (YYYY-MM-DD).
    #[arg(long)]
    pub date: String,

    /// Incident time (HH:MM).
    #[arg(long)]
    pub time: String,

    /// Where the incident happened.
    #[arg(long)]
    pub location: String,

    /// What happened.
    #[arg(long)]
    pub description: String,

    /// Evidence file to upload with the report.
    #[arg(long, value_name = "PATH")]
    pub evidence: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FileOutput {
    id: String,
    status: Stage,
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    evidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    evidence_url: Option<String>,
    notice: Notice,
}

fn read_evidence(path: &Path, limit: u64) -> Result<Result<(String, Vec<u8>), FirError>> {
    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to read evidence file {}", path.display()))?
        .len();
    if let Err(err) = ensure_within_limit(size, limit) {
        return Ok(Err(err));
    }

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read evidence file {}", path.display()))?;
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(Ok((file_name, bytes)))
}

pub async fn run_file(
    args: &FileArgs,
    account_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    let category = match validate::validate_category(&args.category) {
        Ok(category) => category,
        Err(e) => {
            return Err(report(output, &CliError::from(&FirError::from(e))));
        }
    };

    let session = Session::open(project_root, output)?;
    let evidence = session.evidence();
    let page = FileReportPage::new(session.store.clone(), evidence.clone());

    let connected = page.connect_wallet(Some(&session.wallet_account(account_flag)));
    if let Err(err) = &connected.result {
        return Err(fail(output, &connected.notice, err));
    }

    page.edit_form(|form| {
        form.name.clone_from(&args.name);
        form.identity_number.clone_from(&args.identity);
        form.address.clone_from(&args.address);
        form.category = Some(category);
        form.incident_date.clone_from(&args.date);
        form.incident_time.clone_from(&args.time);
        form.location.clone_from(&args.location);
        form.description.clone_from(&args.description);
    });

    if let Some(path) = &args.evidence {
        let attached = match read_evidence(path, evidence.max_bytes())? {
            Ok((file_name, bytes)) => page.attach_evidence(&file_name, bytes),
            Err(err) => return Err(fail(output, &file_too_large(evidence.max_bytes()), &err)),
        };
        if let Err(err) = &attached.result {
            return Err(fail(output, &attached.notice, err));
        }
    }

    let outcome = page.submit().await;
    let id = match outcome.result {
        Ok(id) => id,
        Err(err) => return Err(fail(output, &outcome.notice, &err)),
    };
    session.save(output)?;

    let handle = session.store.get(&id).and_then(|r| r.evidence);
    let result = FileOutput {
        evidence_url: evidence_url(&evidence, handle.as_ref()),
        evidence: handle.map(|h| h.to_string()),
        id,
        status: Stage::Filed,
        category,
        notice: outcome.notice,
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ {}", r.notice.title)?;
        pretty_kv(w, "FIR ID", &r.id)?;
        pretty_kv(w, "Status", r.status.as_str())?;
        pretty_kv(w, "Category", r.category.as_str())?;
        if let Some(url) = &r.evidence_url {
            pretty_kv(w, "Evidence", url)?;
        }
        Ok(())
    })
}
