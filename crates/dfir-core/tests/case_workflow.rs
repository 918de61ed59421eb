//! End-to-end case workflow through the page controllers: file a report,
//! track it, move it through review, and persist the result.

use std::sync::Arc;
use std::time::Duration;

use dfir_core::clock::{Latency, ManualClock};
use dfir_core::config::AdminConfig;
use dfir_core::evidence::MemoryEvidenceStore;
use dfir_core::lifecycle::Tone;
use dfir_core::model::case::{Category, Stage};
use dfir_core::pages::{AdminPage, FileReportPage, HomePage, TrackStatusPage};
use dfir_core::snapshot;
use dfir_core::store::CaseStore;
use dfir_core::wallet::DEMO_ACCOUNT;
use dfir_core::{FirError, fingerprint};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    clock: Arc<ManualClock>,
    store: Arc<CaseStore>,
    filing: FileReportPage,
    tracking: TrackStatusPage,
    admin: AdminPage,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::default());
    let store = Arc::new(CaseStore::new(clock.clone(), Latency::default()));
    let evidence = Arc::new(MemoryEvidenceStore::default());
    Harness {
        filing: FileReportPage::new(store.clone(), evidence),
        tracking: TrackStatusPage::new(store.clone()),
        admin: AdminPage::new(store.clone(), AdminConfig::default()),
        clock,
        store,
    }
}

async fn file_raj_kumar(h: &Harness) -> String {
    h.filing.connect_wallet(Some(DEMO_ACCOUNT));
    h.filing.edit_form(|f| {
        f.name = "Raj Kumar".into();
        f.identity_number = "1234-5678-9012".into();
        f.address = "12 Residency Road, Bangalore".into();
        f.category = Some(Category::Theft);
        f.incident_date = "2024-06-08".into();
        f.incident_time = "14:30".into();
        f.location = "MG Road, Bangalore".into();
        f.description = "Mobile phone snatched near the metro exit".into();
    });
    h.filing
        .attach_evidence("cctv.png", b"frame bytes".to_vec());
    h.filing.submit().await.into_result().expect("submit")
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn filed_report_can_be_tracked_by_id_and_account() {
    let h = harness();
    let id = file_raj_kumar(&h).await;

    let by_id = h.tracking.search(&id).await.into_result().expect("by id");
    assert_eq!(by_id.record.status, Stage::Filed);
    assert_eq!(by_id.record.completed_stages(), 1);
    assert_eq!(by_id.style.tone, Tone::Blue);
    assert_eq!(
        by_id.record.identity_fingerprint,
        fingerprint("1234-5678-9012")
    );
    assert!(by_id.record.evidence.is_some());

    let by_account = h
        .tracking
        .search(DEMO_ACCOUNT)
        .await
        .into_result()
        .expect("by account");
    assert_eq!(by_account.record.id, id);
}

#[tokio::test(start_paused = true)]
async fn admin_moves_case_to_resolution() {
    let h = harness();
    let id = file_raj_kumar(&h).await;
    h.admin.connect_wallet(Some(DEMO_ACCOUNT));

    for stage in ["Acknowledged", "Under Review", "Investigation", "Resolved"] {
        h.clock.advance(Duration::from_secs(3600));
        let outcome = h.admin.update_status(&id, stage).await;
        assert_eq!(outcome.notice.title, "Status Updated", "moving to {stage}");
    }

    let view = h.tracking.search(&id).await.into_result().expect("fetch");
    assert_eq!(view.record.status, Stage::Resolved);
    assert_eq!(view.record.completed_stages(), 5);
    assert!(view.timeline.connectors.iter().all(|active| *active));
    view.record.check_invariants().expect("invariants hold");

    let reopened = h.admin.update_status(&id, "Investigation").await;
    assert_eq!(reopened.notice.title, "Update Rejected");
    assert!(matches!(
        reopened.result,
        Err(FirError::InvalidTransition(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn skipping_stages_fills_the_timeline() {
    let h = harness();
    let id = file_raj_kumar(&h).await;
    h.admin.connect_wallet(Some(DEMO_ACCOUNT));

    h.clock.advance(Duration::from_secs(7200));
    let record = h
        .admin
        .update_status(&id, "Under Review")
        .await
        .into_result()
        .expect("update");
    assert_eq!(record.completed_stages(), 3);
    assert_eq!(record.timeline[1].completed_at, record.timeline[2].completed_at);
}

#[tokio::test(start_paused = true)]
async fn home_page_reflects_store() {
    let h = harness();
    file_raj_kumar(&h).await;
    let home = HomePage::new(h.store.clone());
    let view = home.load().await.into_result().expect("load");
    assert_eq!(view.stats.total, 1);
    assert_eq!(view.stats.pending, 1);
}

#[tokio::test(start_paused = true)]
async fn persisted_cases_survive_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let h = harness();
    let id = file_raj_kumar(&h).await;
    snapshot::save_from(&h.store, dir.path()).expect("save");

    let reloaded = CaseStore::new(Arc::new(ManualClock::default()), Latency::none());
    snapshot::load_into(&reloaded, dir.path()).expect("load");
    let record = reloaded.fetch_by_id_or_account(&id).await.expect("fetch");
    assert_eq!(record.complainant_name, "Raj Kumar");

    let raw = std::fs::read_to_string(snapshot::snapshot_path(dir.path())).expect("read");
    assert!(!raw.contains("1234-5678-9012"));
}
