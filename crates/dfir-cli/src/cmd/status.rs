//! `dfir status`: look a case up by FIR ID or filer wallet address and show
//! its timeline.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use dfir_core::evidence::{ContentHandle, EvidenceStore, MemoryEvidenceStore};
use dfir_core::format::{format_date, format_timestamp};
use dfir_core::lifecycle::{TimelineView, stage_style};
use dfir_core::model::case::CaseRecord;
use dfir_core::pages::{StatusView, TrackStatusPage};
use dfir_core::wallet::truncate_address;

use super::{Session, fail};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// FIR ID (case-insensitive) or the wallet address that filed it.
    pub query: String,
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    #[serde(flatten)]
    view: StatusView,
    #[serde(skip_serializing_if = "Option::is_none")]
    evidence_url: Option<String>,
}

/// Public URL for a record's evidence, if it has any.
pub fn evidence_url(evidence: &MemoryEvidenceStore, handle: Option<&ContentHandle>) -> Option<String> {
    handle.map(|h| evidence.resolve(h))
}

/// Pretty block for one case: header, details, and the stage timeline.
pub fn write_case_pretty(
    w: &mut dyn Write,
    record: &CaseRecord,
    evidence_url: Option<&str>,
) -> io::Result<()> {
    let style = stage_style(record.status);
    pretty_section(
        w,
        &format!("{}  {} {}", record.id, style.icon.glyph(), record.status),
    )?;
    pretty_kv(w, "Complainant", &record.complainant_name)?;
    pretty_kv(w, "Identity", format!("#{}", record.identity_fingerprint))?;
    pretty_kv(w, "Category", record.category.as_str())?;
    pretty_kv(
        w,
        "Incident",
        format!(
            "{} at {}",
            format_date(&record.incident_date),
            record.incident_time
        ),
    )?;
    pretty_kv(w, "Location", &record.location)?;
    pretty_kv(
        w,
        "Officer",
        record.officer_assigned.as_deref().unwrap_or("Not Assigned"),
    )?;
    if let Some(account) = &record.filed_by {
        pretty_kv(w, "Filed by", truncate_address(account))?;
    }
    if let Some(url) = evidence_url {
        pretty_kv(w, "Evidence", url)?;
    }
    pretty_kv(w, "Filed", format_timestamp(record.filed_at))?;
    pretty_kv(w, "Last updated", format_timestamp(record.last_updated_at))?;
    writeln!(w)?;
    pretty_kv(w, "Description", &record.description)?;
    writeln!(w)?;
    write_timeline(w, &TimelineView::of(record))
}

fn write_timeline(w: &mut dyn Write, view: &TimelineView) -> io::Result<()> {
    writeln!(w, "Timeline")?;
    for (i, item) in view.items.iter().enumerate() {
        let marker = if item.completed { "●" } else { "○" };
        let when = item
            .timestamp
            .map_or_else(|| "pending".to_string(), format_timestamp);
        writeln!(w, "  {marker} {:<14} {when}", item.stage.as_str())?;
        writeln!(w, "  {}   {}", connector(view, i), item.description)?;
    }
    Ok(())
}

fn connector(view: &TimelineView, index: usize) -> &'static str {
    match view.connectors.get(index) {
        Some(true) => "┃",
        Some(false) => "┆",
        None => " ",
    }
}

pub async fn run_status(args: &StatusArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let session = Session::open(project_root, output)?;
    let evidence = session.evidence();
    let page = TrackStatusPage::new(session.store.clone());

    let outcome = page.search(&args.query).await;
    let view = match outcome.result {
        Ok(view) => view,
        Err(err) => return Err(fail(output, &outcome.notice, &err)),
    };

    let result = StatusOutput {
        evidence_url: evidence_url(&evidence, view.record.evidence.as_ref()),
        view,
    };
    render_mode(
        output,
        &result,
        |r, w| {
            let record = &r.view.record;
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                record.id,
                record.status,
                record.category,
                record.officer_assigned.as_deref().unwrap_or("-")
            )
        },
        |r, w| write_case_pretty(w, &r.view.record, r.evidence_url.as_deref()),
    )
}
