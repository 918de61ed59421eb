//! Simulated remote case store.
//!
//! Every operation first awaits its configured [`Latency`], then applies its
//! change under a short-lived lock. Validation happens before the record map
//! is touched, so a failed call never leaves a partial write behind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::{Clock, Latency, RemoteOp, SystemClock};
use crate::error::FirError;
use crate::fingerprint::fingerprint;
use crate::lifecycle;
use crate::model::case::{CaseDetails, CaseRecord, InvalidTransition, Stage};
use crate::model::form::FilingForm;
use crate::validate::{self, ValidationError};

/// Default prefix for newly assigned case ids.
pub const DEFAULT_ID_PREFIX: &str = "FIR";

/// How [`CaseStore::fetch_by_id_or_account`] matches a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupPolicy {
    /// Case id (after normalization) or filer account must match.
    #[default]
    Exact,
    /// Any non-empty query returns the newest record.
    Permissive,
}

/// Admin listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseFilter {
    /// Case-insensitive substring of the id or complainant name.
    pub search: Option<String>,
    pub status: Option<Stage>,
}

impl CaseFilter {
    fn matches(&self, record: &CaseRecord) -> bool {
        let search_ok = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .is_none_or(|needle| {
                let needle = needle.to_lowercase();
                record.id.to_lowercase().contains(&needle)
                    || record.complainant_name.to_lowercase().contains(&needle)
            });
        let status_ok = self.status.is_none_or(|s| record.status == s);
        search_ok && status_ok
    }
}

/// Case counts for dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaseStats {
    pub total: usize,
    /// Filed or acknowledged, not yet picked up for review.
    pub pending: usize,
    pub filed: usize,
    pub acknowledged: usize,
    pub under_review: usize,
    pub investigation: usize,
    pub resolved: usize,
}

impl CaseStats {
    fn tally(records: impl Iterator<Item = Stage>) -> Self {
        let mut stats = Self::default();
        for stage in records {
            stats.total += 1;
            match stage {
                Stage::Filed => stats.filed += 1,
                Stage::Acknowledged => stats.acknowledged += 1,
                Stage::UnderReview => stats.under_review += 1,
                Stage::Investigation => stats.investigation += 1,
                Stage::Resolved => stats.resolved += 1,
            }
        }
        stats.pending = stats.filed + stats.acknowledged;
        stats
    }
}

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<String, CaseRecord>,
    last_id_millis: i64,
}

/// In-memory case store with simulated network latency.
///
/// Single-session: callers are expected to issue one request at a time per
/// page. The internal lock only guards against torn writes, not against
/// competing administrators.
#[derive(Debug)]
pub struct CaseStore {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
    latency: Latency,
    lookup: LookupPolicy,
    id_prefix: String,
}

impl Default for CaseStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Latency::default())
    }
}

impl CaseStore {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, latency: Latency) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
            latency,
            lookup: LookupPolicy::default(),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub const fn with_lookup(mut self, lookup: LookupPolicy) -> Self {
        self.lookup = lookup;
        self
    }

    /// Prefix for new ids. Stored normalized, since every lookup
    /// normalizes its query the same way.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = validate::normalize_case_id(&prefix.into());
        self
    }

    #[must_use]
    pub const fn lookup_policy(&self) -> LookupPolicy {
        self.lookup
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// File a new report.
    ///
    /// # Errors
    ///
    /// [`FirError::Validation`] if a required field is blank or the identity
    /// number is malformed. Nothing is stored in that case.
    pub async fn submit(&self, form: &FilingForm) -> Result<String, FirError> {
        self.latency.wait(RemoteOp::Submit).await;

        let category = validate::validate_filing(form).inspect_err(|err| {
            tracing::warn!(field = err.field, code = err.code, "filing rejected");
        })?;

        let details = CaseDetails {
            complainant_name: form.name.trim().to_string(),
            address: form.address.trim().to_string(),
            identity_fingerprint: fingerprint(&form.identity_number),
            category,
            incident_date: form.incident_date.trim().to_string(),
            incident_time: form.incident_time.trim().to_string(),
            location: form.location.trim().to_string(),
            description: form.description.trim().to_string(),
            evidence: form.evidence.clone(),
            filed_by: form
                .account
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_ascii_lowercase),
        };

        let now = self.clock.now();
        let mut state = self.state();
        let next = now.timestamp_millis().max(state.last_id_millis + 1);
        state.last_id_millis = next;
        let id = format!("{}{next}", self.id_prefix);

        let record = CaseRecord::filed(id.clone(), details, now);
        state.records.insert(id.clone(), record);

        tracing::info!(case_id = %id, %category, "case filed");
        Ok(id)
    }

    /// Look a case up by id, or by the wallet account that filed it.
    ///
    /// # Errors
    ///
    /// [`FirError::Validation`] for a blank query, [`FirError::NotFound`]
    /// when nothing matches.
    pub async fn fetch_by_id_or_account(&self, query: &str) -> Result<CaseRecord, FirError> {
        self.latency.wait(RemoteOp::Fetch).await;

        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::new(
                "query",
                query,
                "must not be empty",
                "enter a FIR ID or wallet address",
                "missing_field",
            )
            .into());
        }

        let state = self.state();
        let found = match self.lookup {
            LookupPolicy::Exact => {
                let id = validate::normalize_case_id(query);
                state.records.get(&id).cloned().or_else(|| {
                    newest(state.records.values().filter(|r| {
                        r.filed_by
                            .as_deref()
                            .is_some_and(|a| a.eq_ignore_ascii_case(query))
                    }))
                })
            }
            LookupPolicy::Permissive => newest(state.records.values()),
        };

        tracing::debug!(query, hit = found.is_some(), "case lookup");
        found.ok_or_else(|| FirError::not_found(query))
    }

    /// Move a case to `new_status`.
    ///
    /// Repeating the current stage is a no-op unless that stage is
    /// `Resolved`, which accepts nothing.
    ///
    /// # Errors
    ///
    /// [`FirError::NotFound`] for an unknown id; [`FirError::InvalidTransition`]
    /// for an unrecognized stage name or a non-forward move.
    pub async fn update_status(
        &self,
        case_id: &str,
        new_status: &str,
    ) -> Result<CaseRecord, FirError> {
        self.latency.wait(RemoteOp::Update).await;

        let id = validate::normalize_case_id(case_id);
        let now = self.clock.now();
        let mut state = self.state();
        let current = state
            .records
            .get(&id)
            .ok_or_else(|| FirError::not_found(case_id))?;

        let target: Stage = new_status.parse().map_err(|_| {
            InvalidTransition::new(current.status, new_status.trim(), "unrecognized stage")
        })?;

        if target == current.status && !target.is_terminal() {
            tracing::debug!(case_id = %id, %target, "status unchanged");
            return Ok(current.clone());
        }

        let next = lifecycle::advance(current, target, now).inspect_err(|err| {
            tracing::warn!(case_id = %id, from = %err.from, to = %err.to, "update rejected");
        })?;

        tracing::info!(case_id = %id, from = %current.status, to = %target, "status updated");
        state.records.insert(id, next.clone());
        Ok(next)
    }

    /// Record the officer handling a case.
    ///
    /// # Errors
    ///
    /// [`FirError::Validation`] for a blank officer label,
    /// [`FirError::NotFound`] for an unknown id.
    pub async fn assign_officer(
        &self,
        case_id: &str,
        officer: &str,
    ) -> Result<CaseRecord, FirError> {
        self.latency.wait(RemoteOp::Update).await;

        let officer = officer.trim();
        if officer.is_empty() {
            return Err(ValidationError::new(
                "officer",
                officer,
                "must not be empty",
                "name the assigned officer, e.g. \"Inspector Sharma\"",
                "missing_field",
            )
            .into());
        }

        let id = validate::normalize_case_id(case_id);
        let now = self.clock.now();
        let mut state = self.state();
        let record = state
            .records
            .get_mut(&id)
            .ok_or_else(|| FirError::not_found(case_id))?;

        record.officer_assigned = Some(officer.to_string());
        record.last_updated_at = record.last_updated_at.max(now);
        tracing::info!(case_id = %id, officer, "officer assigned");
        Ok(record.clone())
    }

    /// Matching records, newest first.
    pub async fn list(&self, filter: &CaseFilter) -> Vec<CaseRecord> {
        self.latency.wait(RemoteOp::Fetch).await;

        let mut records: Vec<CaseRecord> = self
            .state()
            .records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.filed_at.cmp(&a.filed_at).then_with(|| b.id.cmp(&a.id)));
        records
    }

    pub async fn stats(&self) -> CaseStats {
        self.latency.wait(RemoteOp::Fetch).await;
        CaseStats::tally(self.state().records.values().map(|r| r.status))
    }

    /// Read one record from local state, skipping the simulated round trip.
    #[must_use]
    pub fn get(&self, case_id: &str) -> Option<CaseRecord> {
        let id = validate::normalize_case_id(case_id);
        self.state().records.get(&id).cloned()
    }

    /// Copy of every record, ordered by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CaseRecord> {
        self.state().records.values().cloned().collect()
    }

    /// Replace the store contents with `records`.
    ///
    /// # Errors
    ///
    /// [`FirError::CorruptSnapshot`] if any record breaks an invariant, has
    /// an id that lookups could never match, or shares an id with another
    /// record. The store is left unchanged on error.
    pub fn restore(&self, records: Vec<CaseRecord>) -> Result<usize, FirError> {
        let mut map = BTreeMap::new();
        let mut last_id_millis = 0i64;
        for record in records {
            record
                .check_invariants()
                .map_err(|reason| FirError::CorruptSnapshot {
                    id: record.id.clone(),
                    reason,
                })?;
            if validate::normalize_case_id(&record.id) != record.id {
                return Err(FirError::CorruptSnapshot {
                    id: record.id,
                    reason: "id is not in normalized form".to_string(),
                });
            }

            if let Some(millis) = record
                .id
                .strip_prefix(self.id_prefix.as_str())
                .and_then(|suffix| suffix.parse::<i64>().ok())
            {
                last_id_millis = last_id_millis.max(millis);
            }

            let id = record.id.clone();
            if map.insert(id.clone(), record).is_some() {
                return Err(FirError::CorruptSnapshot {
                    id,
                    reason: "duplicate id".to_string(),
                });
            }
        }

        let count = map.len();
        let mut state = self.state();
        state.records = map;
        state.last_id_millis = last_id_millis;
        tracing::debug!(count, "case store restored");
        Ok(count)
    }
}

fn newest<'a>(records: impl Iterator<Item = &'a CaseRecord>) -> Option<CaseRecord> {
    records
        .max_by(|a, b| a.filed_at.cmp(&b.filed_at).then_with(|| a.id.cmp(&b.id)))
        .cloned()
}
