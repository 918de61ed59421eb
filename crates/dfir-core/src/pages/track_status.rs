use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

use super::{BusyFlag, Notice, Outcome};
use crate::error::FirError;
use crate::lifecycle::{StageStyle, TimelineView, stage_style};
use crate::model::case::CaseRecord;
use crate::store::CaseStore;
use crate::validate::ValidationError;

/// A found case, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub record: CaseRecord,
    pub timeline: TimelineView,
    pub style: StageStyle,
}

impl StatusView {
    #[must_use]
    pub fn of(record: CaseRecord) -> Self {
        Self {
            timeline: TimelineView::of(&record),
            style: stage_style(record.status),
            record,
        }
    }
}

/// The status lookup screen. Keeps the last successful result on display
/// until a new search succeeds.
#[derive(Debug)]
pub struct TrackStatusPage {
    store: Arc<CaseStore>,
    current: Mutex<Option<StatusView>>,
    busy: BusyFlag,
}

impl TrackStatusPage {
    #[must_use]
    pub fn new(store: Arc<CaseStore>) -> Self {
        Self {
            store,
            current: Mutex::new(None),
            busy: BusyFlag::default(),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<StatusView> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn search(&self, query: &str) -> Outcome<StatusView> {
        if query.trim().is_empty() {
            let err = ValidationError::new(
                "query",
                query,
                "must not be empty",
                "enter a FIR ID or wallet address",
                "missing_field",
            );
            return Outcome::err(
                err.into(),
                Notice::error(
                    "Search Query Required",
                    "Please enter a FIR ID or wallet address",
                ),
            );
        }

        let Ok(_guard) = self.busy.try_acquire() else {
            return Outcome::busy();
        };

        match self.store.fetch_by_id_or_account(query).await {
            Ok(record) => {
                let view = StatusView::of(record);
                *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(view.clone());
                Outcome::ok(
                    view,
                    Notice::success("FIR Found", "FIR details retrieved successfully"),
                )
            }
            Err(err @ FirError::NotFound { .. }) => Outcome::err(
                err,
                Notice::error("FIR Not Found", "Could not find FIR with the provided ID"),
            ),
            Err(err) => {
                let notice = Notice::error("Search Failed", err.to_string());
                Outcome::err(err, notice)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Latency, ManualClock};
    use crate::lifecycle::Tone;
    use crate::model::case::{Category, Stage};
    use crate::model::form::FilingForm;

    async fn seeded() -> (Arc<CaseStore>, String) {
        let store = Arc::new(CaseStore::new(
            Arc::new(ManualClock::default()),
            Latency::default(),
        ));
        let id = store
            .submit(&FilingForm {
                name: "Amit Gupta".into(),
                identity_number: "4444-5555-6666".into(),
                address: "Whitefield".into(),
                category: Some(Category::Assault),
                incident_date: "2024-06-06".into(),
                incident_time: "20:15".into(),
                location: "Whitefield, Bangalore".into(),
                description: "Assaulted near metro station".into(),
                ..FilingForm::default()
            })
            .await
            .unwrap();
        store.update_status(&id, "Under Review").await.unwrap();
        (store, id)
    }

    #[tokio::test(start_paused = true)]
    async fn found_case_renders_timeline() {
        let (store, id) = seeded().await;
        let page = TrackStatusPage::new(store);

        let outcome = page.search(&id.to_lowercase()).await;
        assert_eq!(outcome.notice.title, "FIR Found");
        let view = outcome.into_result().unwrap();
        assert_eq!(view.record.status, Stage::UnderReview);
        assert_eq!(view.style.tone, Tone::Yellow);
        assert_eq!(view.timeline.connectors, vec![true, true, true, false]);
        assert_eq!(page.current(), Some(view));
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_never_reaches_the_store() {
        let (store, _) = seeded().await;
        let page = TrackStatusPage::new(store);

        let started = tokio::time::Instant::now();
        let outcome = page.search("  ").await;
        assert_eq!(started.elapsed(), std::time::Duration::ZERO);
        assert_eq!(outcome.notice.title, "Search Query Required");
        assert!(matches!(outcome.result, Err(FirError::Validation(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn miss_keeps_previous_result() {
        let (store, id) = seeded().await;
        let page = TrackStatusPage::new(store);
        page.search(&id).await.into_result().unwrap();

        let outcome = page.search("FIR000").await;
        assert_eq!(outcome.notice.title, "FIR Not Found");
        assert!(outcome.notice.is_error());
        assert_eq!(page.current().map(|v| v.record.id), Some(id));
    }
}
