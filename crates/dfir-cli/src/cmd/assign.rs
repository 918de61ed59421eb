use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use dfir_core::model::case::Stage;
use dfir_core::pages::Notice;

use super::{Session, admin_page, fail};
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// FIR ID to assign.
    pub id: String,

    /// Officer label, e.g. "Inspector Sharma".
    pub officer: String,
}

#[derive(Debug, Serialize)]
struct AssignOutput {
    id: String,
    officer: String,
    status: Stage,
    notice: Notice,
}

pub async fn run_assign(
    args: &AssignArgs,
    account_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    let session = Session::open(project_root, output)?;
    let page = admin_page(&session, account_flag, output)?;

    let outcome = page.assign_officer(&args.id, &args.officer).await;
    let record = match outcome.result {
        Ok(record) => record,
        Err(err) => return Err(fail(output, &outcome.notice, &err)),
    };
    session.save(output)?;

    let result = AssignOutput {
        officer: record.officer_assigned.unwrap_or_default(),
        id: record.id,
        status: record.status,
        notice: outcome.notice,
    };
    render(output, &result, |r, w| writeln!(w, "✓ {}", r.notice.description))
}
