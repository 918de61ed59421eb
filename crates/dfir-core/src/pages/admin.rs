use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{BusyFlag, Notice, Outcome};
use crate::config::AdminConfig;
use crate::error::FirError;
use crate::model::case::CaseRecord;
use crate::store::{CaseFilter, CaseStats, CaseStore};
use crate::wallet::{WalletSession, truncate_address};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminView {
    pub stats: CaseStats,
    pub cases: Vec<CaseRecord>,
}

/// The officer dashboard. Every action needs an authorized wallet.
#[derive(Debug)]
pub struct AdminPage {
    store: Arc<CaseStore>,
    admins: AdminConfig,
    wallet: Mutex<WalletSession>,
    busy: BusyFlag,
}

impl AdminPage {
    #[must_use]
    pub fn new(store: Arc<CaseStore>, admins: AdminConfig) -> Self {
        Self {
            store,
            admins,
            wallet: Mutex::new(WalletSession::new()),
            busy: BusyFlag::default(),
        }
    }

    fn wallet(&self) -> MutexGuard<'_, WalletSession> {
        self.wallet.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Connect and check the account against the admin list. An account
    /// that is not on the list is disconnected again.
    pub fn connect_wallet(&self, provider: Option<&str>) -> Outcome<String> {
        let mut wallet = self.wallet();
        let account = match wallet.connect(provider) {
            Ok(account) => account.to_string(),
            Err(err) => return Outcome::err(err, access_denied()),
        };

        if !self.admins.is_authorized(&account) {
            wallet.disconnect();
            tracing::warn!(account = %truncate_address(&account), "admin access denied");
            return Outcome::err(FirError::AccessDenied { account }, access_denied());
        }

        Outcome::ok(
            account,
            Notice::success(
                "Admin Access Granted",
                "Connected as authorized administrator",
            ),
        )
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.wallet()
            .account()
            .is_some_and(|a| self.admins.is_authorized(a))
    }

    fn require_admin<T>(&self) -> Result<(), Outcome<T>> {
        if self.is_authorized() {
            return Ok(());
        }
        let account = self.wallet().account().unwrap_or_default().to_string();
        Err(Outcome::err(
            FirError::AccessDenied { account },
            access_denied(),
        ))
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Stats and the filtered case table.
    pub async fn dashboard(&self, filter: &CaseFilter) -> Outcome<AdminView> {
        if let Err(denied) = self.require_admin() {
            return denied;
        }
        let Ok(_guard) = self.busy.try_acquire() else {
            return Outcome::busy();
        };

        let stats = self.store.stats().await;
        let cases = self.store.list(filter).await;
        let notice = Notice::success("Dashboard Loaded", format!("{} FIRs shown", cases.len()));
        Outcome::ok(AdminView { stats, cases }, notice)
    }

    pub async fn update_status(&self, case_id: &str, new_status: &str) -> Outcome<CaseRecord> {
        if let Err(denied) = self.require_admin() {
            return denied;
        }
        let Ok(_guard) = self.busy.try_acquire() else {
            return Outcome::busy();
        };

        match self.store.update_status(case_id, new_status).await {
            Ok(record) => {
                let notice = Notice::success(
                    "Status Updated",
                    format!("FIR {} status changed to {}", record.id, record.status),
                );
                Outcome::ok(record, notice)
            }
            Err(err) => {
                let notice = match &err {
                    FirError::NotFound { .. } => not_found(case_id),
                    FirError::InvalidTransition(inner) => {
                        Notice::error("Update Rejected", inner.to_string())
                    }
                    other => Notice::error("Update Failed", other.to_string()),
                };
                Outcome::err(err, notice)
            }
        }
    }

    pub async fn assign_officer(&self, case_id: &str, officer: &str) -> Outcome<CaseRecord> {
        if let Err(denied) = self.require_admin() {
            return denied;
        }
        let Ok(_guard) = self.busy.try_acquire() else {
            return Outcome::busy();
        };

        match self.store.assign_officer(case_id, officer).await {
            Ok(record) => {
                let notice = Notice::success(
                    "Officer Assigned",
                    format!(
                        "{} assigned to FIR {}",
                        record.officer_assigned.as_deref().unwrap_or_default(),
                        record.id
                    ),
                );
                Outcome::ok(record, notice)
            }
            Err(err @ FirError::NotFound { .. }) => Outcome::err(err, not_found(case_id)),
            Err(err) => {
                let notice = Notice::error("Assignment Failed", err.to_string());
                Outcome::err(err, notice)
            }
        }
    }
}

fn access_denied() -> Notice {
    Notice::error(
        "Access Denied",
        "Only authorized wallets can access admin dashboard",
    )
}

fn not_found(case_id: &str) -> Notice {
    Notice::error("FIR Not Found", format!("No FIR with ID {}", case_id.trim()))
}
