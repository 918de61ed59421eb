//! `dfir update`: move a case forward in its lifecycle.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use dfir_core::format::format_timestamp;
use dfir_core::model::case::Stage;
use dfir_core::pages::Notice;

use super::{Session, admin_page, fail};
use crate::output::{OutputMode, pretty_kv, render};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// FIR ID to update.
    pub id: String,

    /// Target stage: filed, acknowledged, under-review, investigation, resolved.
    pub stage: String,
}

#[derive(Debug, Serialize)]
struct UpdateOutput {
    id: String,
    status: Stage,
    completed_stages: usize,
    last_updated_at: DateTime<Utc>,
    notice: Notice,
}

pub async fn run_update(
    args: &UpdateArgs,
    account_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    let session = Session::open(project_root, output)?;
    let page = admin_page(&session, account_flag, output)?;

    let outcome = page.update_status(&args.id, &args.stage).await;
    let record = match outcome.result {
        Ok(record) => record,
        Err(err) => return Err(fail(output, &outcome.notice, &err)),
    };
    session.save(output)?;

    let result = UpdateOutput {
        completed_stages: record.completed_stages(),
        id: record.id,
        status: record.status,
        last_updated_at: record.last_updated_at,
        notice: outcome.notice,
    };
    render(output, &result, |r, w| {
        writeln!(w, "✓ {}", r.notice.description)?;
        pretty_kv(w, "Stage", format!("{} ({}/5)", r.status, r.completed_stages))?;
        pretty_kv(w, "Updated", format_timestamp(r.last_updated_at))
    })
}
