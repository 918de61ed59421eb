use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::evidence::ContentHandle;

/// The fixed set of complaint types a report can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Theft,
    Fraud,
    Assault,
    Harassment,
    Cybercrime,
    #[serde(rename = "Property Dispute")]
    PropertyDispute,
    #[serde(rename = "Missing Person")]
    MissingPerson,
    #[serde(rename = "Traffic Violation")]
    TrafficViolation,
    #[serde(rename = "Domestic Violence")]
    DomesticViolence,
    Other,
}

impl Category {
    pub const ALL: [Self; 10] = [
        Self::Theft,
        Self::Fraud,
        Self::Assault,
        Self::Harassment,
        Self::Cybercrime,
        Self::PropertyDispute,
        Self::MissingPerson,
        Self::TrafficViolation,
        Self::DomesticViolence,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Theft => "Theft",
            Self::Fraud => "Fraud",
            Self::Assault => "Assault",
            Self::Harassment => "Harassment",
            Self::Cybercrime => "Cybercrime",
            Self::PropertyDispute => "Property Dispute",
            Self::MissingPerson => "Missing Person",
            Self::TrafficViolation => "Traffic Violation",
            Self::DomesticViolence => "Domestic Violence",
            Self::Other => "Other",
        }
    }
}

/// The five lifecycle stages, in their only legal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Filed,
    Acknowledged,
    #[serde(rename = "Under Review")]
    UnderReview,
    Investigation,
    Resolved,
}

impl Stage {
    pub const ALL: [Self; 5] = [
        Self::Filed,
        Self::Acknowledged,
        Self::UnderReview,
        Self::Investigation,
        Self::Resolved,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filed => "Filed",
            Self::Acknowledged => "Acknowledged",
            Self::UnderReview => "Under Review",
            Self::Investigation => "Investigation",
            Self::Resolved => "Resolved",
        }
    }

    /// Zero-based position in the lifecycle.
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Timeline text shown next to the stage.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Filed => "FIR filed and recorded",
            Self::Acknowledged => "FIR acknowledged by police station",
            Self::UnderReview => "Case assigned to investigating officer",
            Self::Investigation => "Investigation in progress",
            Self::Resolved => "Case resolved and closed",
        }
    }

    /// Validate a forward move from `self` to `target`.
    ///
    /// Only strictly later stages are reachable; there is no reopen and no
    /// transition out of `Resolved`.
    pub fn can_advance_to(self, target: Self) -> Result<(), InvalidTransition> {
        if self.is_terminal() {
            return Err(InvalidTransition::new(
                self,
                target.as_str(),
                "case is already resolved",
            ));
        }

        if target <= self {
            return Err(InvalidTransition::new(
                self,
                target.as_str(),
                "stages only move forward",
            ));
        }

        Ok(())
    }
}

/// Error returned when a status change violates the lifecycle order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot move case from {from} to {to}: {reason}")]
pub struct InvalidTransition {
    pub from: Stage,
    /// Requested stage as given; may not name a real stage.
    pub to: String,
    pub reason: &'static str,
}

impl InvalidTransition {
    pub(crate) fn new(from: Stage, to: impl Into<String>, reason: &'static str) -> Self {
        Self {
            from,
            to: to.into(),
            reason,
        }
    }
}

/// One stage slot in a case timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub stage: Stage,
    pub completed_at: Option<DateTime<Utc>>,
    pub description: String,
}

impl TimelineEntry {
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// One filed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: String,
    pub complainant_name: String,
    pub address: String,
    pub identity_fingerprint: String,
    pub category: Category,
    pub incident_date: String,
    pub incident_time: String,
    pub location: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<ContentHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filed_by: Option<String>,
    pub status: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub officer_assigned: Option<String>,
    pub filed_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub timeline: Vec<TimelineEntry>,
}

/// Everything a new record needs beyond its id and filing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDetails {
    pub complainant_name: String,
    pub address: String,
    pub identity_fingerprint: String,
    pub category: Category,
    pub incident_date: String,
    pub incident_time: String,
    pub location: String,
    pub description: String,
    pub evidence: Option<ContentHandle>,
    pub filed_by: Option<String>,
}

impl CaseRecord {
    /// Build a fresh record in the `Filed` stage.
    #[must_use]
    pub fn filed(id: String, details: CaseDetails, now: DateTime<Utc>) -> Self {
        let timeline = Stage::ALL
            .iter()
            .map(|&stage| TimelineEntry {
                stage,
                completed_at: (stage == Stage::Filed).then_some(now),
                description: stage.description().to_string(),
            })
            .collect();

        Self {
            id,
            complainant_name: details.complainant_name,
            address: details.address,
            identity_fingerprint: details.identity_fingerprint,
            category: details.category,
            incident_date: details.incident_date,
            incident_time: details.incident_time,
            location: details.location,
            description: details.description,
            evidence: details.evidence,
            filed_by: details.filed_by,
            status: Stage::Filed,
            officer_assigned: None,
            filed_at: now,
            last_updated_at: now,
            timeline,
        }
    }

    /// Number of completed timeline entries.
    #[must_use]
    pub fn completed_stages(&self) -> usize {
        self.timeline.iter().filter(|e| e.is_completed()).count()
    }

    /// Check the structural invariants of a record.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id is empty".to_string());
        }

        if self.timeline.len() != Stage::ALL.len() {
            return Err(format!(
                "timeline has {} entries, expected {}",
                self.timeline.len(),
                Stage::ALL.len()
            ));
        }

        let mut last_completed: Option<&TimelineEntry> = None;
        let mut seen_pending = false;
        for (entry, expected) in self.timeline.iter().zip(Stage::ALL) {
            if entry.stage != expected {
                return Err(format!(
                    "timeline slot for {expected} holds {}",
                    entry.stage
                ));
            }

            match entry.completed_at {
                Some(ts) => {
                    if seen_pending {
                        return Err(format!("{} completed after a skipped stage", entry.stage));
                    }
                    let prev = last_completed.and_then(|p| p.completed_at);
                    if prev.is_some_and(|prev| ts < prev) {
                        return Err(format!("{} completed before its predecessor", entry.stage));
                    }
                    last_completed = Some(entry);
                }
                None => seen_pending = true,
            }
        }

        match last_completed {
            None => Err("Filed stage is not completed".to_string()),
            Some(entry) if entry.stage != self.status => Err(format!(
                "status {} does not match last completed stage {}",
                self.status, entry.stage
            )),
            Some(_) if self.last_updated_at < self.filed_at => {
                Err("last update precedes filing".to_string())
            }
            Some(_) => Ok(()),
        }
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase and fold `_`, `-` and runs of spaces into nothing so
/// `Under Review`, `under_review` and `UnderReview` compare equal.
fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-') && !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|c| normalize(c.as_str()) == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "category",
                got: s.to_string(),
            })
    }
}

impl FromStr for Stage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "filed" => Ok(Self::Filed),
            "acknowledged" => Ok(Self::Acknowledged),
            "underreview" => Ok(Self::UnderReview),
            "investigation" => Ok(Self::Investigation),
            "resolved" => Ok(Self::Resolved),
            _ => Err(ParseEnumError {
                expected: "stage",
                got: s.to_string(),
            }),
        }
    }
}
