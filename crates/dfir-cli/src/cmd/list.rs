//! `dfir list`: admin case table with search and stage filters.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use dfir_core::error::FirError;
use dfir_core::format::format_date;
use dfir_core::model::case::{CaseRecord, Category, Stage};
use dfir_core::store::CaseFilter;
use dfir_core::validate;

use super::{Session, admin_page, fail};
use crate::output::{CliError, OutputMode, Renderable, render_list, report};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Match FIR ID or complainant name (case-insensitive substring).
    #[arg(long)]
    pub search: Option<String>,

    /// Only show cases in this stage.
    #[arg(long)]
    pub status: Option<String>,
}

/// One row of the case table.
#[derive(Debug, Serialize)]
struct CaseRow {
    id: String,
    complainant: String,
    category: Category,
    incident_date: String,
    location: String,
    status: Stage,
    officer: Option<String>,
}

impl From<CaseRecord> for CaseRow {
    fn from(record: CaseRecord) -> Self {
        Self {
            id: record.id,
            complainant: record.complainant_name,
            category: record.category,
            incident_date: record.incident_date,
            location: record.location,
            status: record.status,
            officer: record.officer_assigned,
        }
    }
}

impl CaseRow {
    fn officer_label(&self) -> &str {
        self.officer.as_deref().unwrap_or("Not Assigned")
    }
}

impl Renderable for CaseRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{:<18} {:<14} {:<18} {}",
            self.id,
            self.status.as_str(),
            self.complainant,
            self.category
        )?;
        writeln!(
            w,
            "{:<18} {} · {} · {}",
            "",
            format_date(&self.incident_date),
            self.location,
            self.officer_label()
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}  {}  {}",
            self.id,
            self.status,
            self.category,
            self.incident_date,
            self.complainant,
            self.officer_label()
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "STATUS", "CATEGORY", "DATE", "COMPLAINANT", "OFFICER"]
    }
}

pub async fn run_list(
    args: &ListArgs,
    account_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    let status = match args.status.as_deref().map(validate::validate_stage).transpose() {
        Ok(status) => status,
        Err(e) => {
            return Err(report(output, &CliError::from(&FirError::from(e))));
        }
    };

    let session = Session::open(project_root, output)?;
    let page = admin_page(&session, account_flag, output)?;

    let filter = CaseFilter {
        search: args.search.clone(),
        status,
    };
    let outcome = page.dashboard(&filter).await;
    let view = match outcome.result {
        Ok(view) => view,
        Err(err) => return Err(fail(output, &outcome.notice, &err)),
    };

    let rows: Vec<CaseRow> = view.cases.into_iter().map(CaseRow::from).collect();
    if rows.is_empty() && !output.is_json() {
        println!("No FIRs match.");
        return Ok(());
    }
    render_list(&rows, output)?;
    Ok(())
}
