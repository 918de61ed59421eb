use anyhow::Result;
use std::io::Write;
use std::path::Path;

use dfir_core::pages::HomePage;

use super::{Session, fail};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Execute `dfir stats`: the landing page headline numbers.
pub async fn run_stats(output: OutputMode, project_root: &Path) -> Result<()> {
    let session = Session::open(project_root, output)?;
    let page = HomePage::new(session.store.clone());

    let outcome = page.load().await;
    let view = match outcome.result {
        Ok(view) => view,
        Err(err) => return Err(fail(output, &outcome.notice, &err)),
    };

    render_mode(
        output,
        &view,
        |v, w| {
            let s = &v.stats;
            writeln!(
                w,
                "total={} pending={} filed={} acknowledged={} under_review={} investigation={} resolved={}",
                s.total,
                s.pending,
                s.filed,
                s.acknowledged,
                s.under_review,
                s.investigation,
                s.resolved
            )
        },
        |v, w| {
            let s = &v.stats;
            pretty_section(w, "Digital FIR")?;
            for feature in &v.features {
                writeln!(w, "  {}: {}", feature.title, feature.description)?;
            }
            writeln!(w)?;
            pretty_kv(w, "Total FIRs", s.total.to_string())?;
            pretty_kv(w, "Pending", s.pending.to_string())?;
            pretty_kv(w, "Under Review", s.under_review.to_string())?;
            pretty_kv(w, "Investigation", s.investigation.to_string())?;
            pretty_kv(w, "Resolved", s.resolved.to_string())?;
            if !v.recent.is_empty() {
                pretty_kv(w, "Recent", v.recent.join(", "))?;
            }
            Ok(())
        },
    )
}
