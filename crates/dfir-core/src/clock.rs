//! Injectable wall clock and simulated remote latency.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Source of "now" for record timestamps and id assignment.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
///
/// Time only moves when [`advance`](Self::advance) or [`set`](Self::set)
/// is called.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Create a clock frozen at a unix timestamp in milliseconds.
    #[must_use]
    pub const fn at_millis(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let step = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        let _ = self
            .millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |m| {
                Some(m.saturating_add(step))
            });
    }

    /// Jump to an arbitrary instant, including backwards.
    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        // 2024-06-08T14:45:00Z
        Self::at_millis(1_717_857_900_000)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Remote operations that carry a simulated delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    Submit,
    Fetch,
    Update,
    Upload,
}

impl RemoteOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Fetch => "fetch",
            Self::Update => "update",
            Self::Upload => "upload",
        }
    }
}

/// Per-operation simulated latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latency {
    pub submit: Duration,
    pub fetch: Duration,
    pub update: Duration,
    pub upload: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            submit: Duration::from_millis(2000),
            fetch: Duration::from_millis(1500),
            update: Duration::from_millis(1000),
            upload: Duration::from_millis(1500),
        }
    }
}

impl Latency {
    /// No delay at all. Operations still yield once before resolving.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            submit: Duration::ZERO,
            fetch: Duration::ZERO,
            update: Duration::ZERO,
            upload: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn for_op(&self, op: RemoteOp) -> Duration {
        match op {
            RemoteOp::Submit => self.submit,
            RemoteOp::Fetch => self.fetch,
            RemoteOp::Update => self.update,
            RemoteOp::Upload => self.upload,
        }
    }

    /// Suspend the caller for the operation's delay.
    ///
    /// A zero delay still yields to the scheduler so a remote call never
    /// completes without suspending.
    pub async fn wait(&self, op: RemoteOp) {
        let delay = self.for_op(op);
        tracing::trace!(op = op.as_str(), ?delay, "simulated latency");
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }
}
