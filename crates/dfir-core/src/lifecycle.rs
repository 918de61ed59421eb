//! Case status state machine and its rendering contract.
//!
//! A case moves `Filed -> Acknowledged -> Under Review -> Investigation ->
//! Resolved`, forward only. [`advance`] is a pure transform; the store
//! decides when to persist its result.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::case::{CaseRecord, InvalidTransition, Stage};

/// Move `record` forward to `target`.
///
/// Every stage up to and including `target` ends up completed. Stages that
/// already carry a timestamp keep it; gaps are filled with `now`, clamped so
/// no stage is stamped earlier than the one before it.
///
/// # Errors
///
/// Returns [`InvalidTransition`] if `target` is not strictly later than the
/// record's current status (including any move out of `Resolved`).
pub fn advance(
    record: &CaseRecord,
    target: Stage,
    now: DateTime<Utc>,
) -> Result<CaseRecord, InvalidTransition> {
    record.status.can_advance_to(target)?;

    let mut next = record.clone();
    let mut floor: Option<DateTime<Utc>> = None;
    for entry in &mut next.timeline {
        if entry.stage > target {
            break;
        }
        let stamp = match entry.completed_at {
            Some(ts) => ts,
            None => floor.map_or(now, |f| now.max(f)),
        };
        entry.completed_at = Some(stamp);
        floor = Some(stamp);
    }

    next.status = target;
    next.last_updated_at = floor.map_or(now, |f| now.max(f));
    Ok(next)
}

/// One rendered timeline row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineItem {
    pub stage: Stage,
    pub completed: bool,
    pub timestamp: Option<DateTime<Utc>>,
    pub description: String,
}

/// Ordered timeline plus the connector state between consecutive rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineView {
    pub items: Vec<TimelineItem>,
    /// `connectors[i]` joins `items[i]` and `items[i + 1]`; it is active iff
    /// `items[i]` is completed.
    pub connectors: Vec<bool>,
}

impl TimelineView {
    #[must_use]
    pub fn of(record: &CaseRecord) -> Self {
        let items: Vec<TimelineItem> = record
            .timeline
            .iter()
            .map(|entry| TimelineItem {
                stage: entry.stage,
                completed: entry.is_completed(),
                timestamp: entry.completed_at,
                description: entry.description.clone(),
            })
            .collect();

        let connectors = items
            .windows(2)
            .map(|pair| pair[0].completed)
            .collect();

        Self { items, connectors }
    }

    /// Index of the current (last completed) row.
    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.items.iter().rposition(|item| item.completed)
    }
}

/// Badge tone for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Blue,
    Purple,
    Yellow,
    Orange,
    Green,
    Gray,
}

/// Badge icon for a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    FileText,
    CheckCircle,
    Clock,
    AlertCircle,
}

impl Icon {
    /// Terminal glyph used by the CLI.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::FileText => "▤",
            Self::CheckCircle => "✓",
            Self::Clock => "◷",
            Self::AlertCircle => "!",
        }
    }
}

/// Presentation hints for a stage badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageStyle {
    pub tone: Tone,
    pub icon: Icon,
}

const STAGE_STYLES: [StageStyle; 5] = [
    StageStyle {
        tone: Tone::Blue,
        icon: Icon::FileText,
    },
    StageStyle {
        tone: Tone::Purple,
        icon: Icon::CheckCircle,
    },
    StageStyle {
        tone: Tone::Yellow,
        icon: Icon::Clock,
    },
    StageStyle {
        tone: Tone::Orange,
        icon: Icon::AlertCircle,
    },
    StageStyle {
        tone: Tone::Green,
        icon: Icon::CheckCircle,
    },
];

/// Style used for a status string that names no stage.
pub const UNKNOWN_STAGE_STYLE: StageStyle = StageStyle {
    tone: Tone::Gray,
    icon: Icon::Clock,
};

/// The one stage-to-badge table every page renders from.
#[must_use]
pub const fn stage_style(stage: Stage) -> StageStyle {
    STAGE_STYLES[stage.ordinal()]
}

/// Style lookup by free-form status text.
#[must_use]
pub fn style_for_status(status: &str) -> StageStyle {
    status
        .parse::<Stage>()
        .map_or(UNKNOWN_STAGE_STYLE, stage_style)
}
