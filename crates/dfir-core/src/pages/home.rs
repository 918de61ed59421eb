use serde::Serialize;
use std::sync::Arc;

use super::{BusyFlag, Notice, Outcome};
use crate::store::{CaseFilter, CaseStats, CaseStore};

/// One selling point on the landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

pub const FEATURES: [Feature; 3] = [
    Feature {
        title: "Tamper-proof",
        description: "Records stored on blockchain cannot be altered or deleted",
    },
    Feature {
        title: "Transparent",
        description: "Track your FIR status in real-time with complete transparency",
    },
    Feature {
        title: "Accessible 24/7",
        description: "File complaints anytime, anywhere without visiting police stations",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeView {
    pub features: Vec<Feature>,
    pub stats: CaseStats,
    /// Ids of the most recently filed cases.
    pub recent: Vec<String>,
}

/// How many recent case ids the landing page shows.
const RECENT_LIMIT: usize = 3;

#[derive(Debug)]
pub struct HomePage {
    store: Arc<CaseStore>,
    busy: BusyFlag,
}

impl HomePage {
    #[must_use]
    pub fn new(store: Arc<CaseStore>) -> Self {
        Self {
            store,
            busy: BusyFlag::default(),
        }
    }

    pub async fn load(&self) -> Outcome<HomeView> {
        let Ok(_guard) = self.busy.try_acquire() else {
            return Outcome::busy();
        };

        let stats = self.store.stats().await;
        let recent = self
            .store
            .list(&CaseFilter::default())
            .await
            .into_iter()
            .take(RECENT_LIMIT)
            .map(|r| r.id)
            .collect();

        Outcome::ok(
            HomeView {
                features: FEATURES.to_vec(),
                stats,
                recent,
            },
            Notice::success(
                "Welcome",
                format!("{} FIRs filed, {} resolved", stats.total, stats.resolved),
            ),
        )
    }
}
