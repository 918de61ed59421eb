//! Page controllers.
//!
//! Each controller owns the state one screen needs and talks to the store
//! through async calls. Every call produces a [`Notice`] for the user,
//! success or not, and a failed call leaves the previous view untouched.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::FirError;

pub mod admin;
pub mod file_report;
pub mod home;
pub mod track_status;

pub use admin::{AdminPage, AdminView};
pub use file_report::FileReportPage;
pub use home::{FEATURES, Feature, HomePage, HomeView};
pub use track_status::{StatusView, TrackStatusPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient message shown after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub level: NoticeLevel,
}

impl Notice {
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NoticeLevel::Success,
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: NoticeLevel::Error,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, NoticeLevel::Error)
    }

    /// Notice for a request rejected because another is still pending.
    #[must_use]
    pub fn busy() -> Self {
        Self::error(
            "Request Pending",
            "Please wait for the current request to finish",
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Result of a page action together with the notice to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub notice: Notice,
    pub result: Result<T, FirError>,
}

impl<T> Outcome<T> {
    pub(crate) const fn ok(value: T, notice: Notice) -> Self {
        Self {
            notice,
            result: Ok(value),
        }
    }

    pub(crate) const fn err(err: FirError, notice: Notice) -> Self {
        Self {
            notice,
            result: Err(err),
        }
    }

    pub(crate) fn busy() -> Self {
        Self::err(FirError::Busy, Notice::busy())
    }

    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Drop the notice and keep the result.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`FirError`] if the action failed.
    pub fn into_result(self) -> Result<T, FirError> {
        self.result
    }
}

/// Single-slot request guard for a controller.
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicBool);

impl BusyFlag {
    /// Claim the flag for one request.
    ///
    /// # Errors
    ///
    /// [`FirError::Busy`] if a request on this controller is still pending.
    pub fn try_acquire(&self) -> Result<BusyGuard<'_>, FirError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FirError::Busy)?;
        Ok(BusyGuard(&self.0))
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears its [`BusyFlag`] when dropped.
#[derive(Debug)]
pub struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Home,
    FileReport,
    TrackStatus,
    Admin,
    NotFound,
}

impl Route {
    /// Resolve a request path. Trailing slashes and query strings are
    /// ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/file-fir" => Self::FileReport,
            "/status" => Self::TrackStatus,
            "/admin" => Self::Admin,
            _ => Self::NotFound,
        }
    }

    /// Canonical path for the route. `NotFound` has none.
    #[must_use]
    pub const fn path(self) -> Option<&'static str> {
        match self {
            Self::Home => Some("/"),
            Self::FileReport => Some("/file-fir"),
            Self::TrackStatus => Some("/status"),
            Self::Admin => Some("/admin"),
            Self::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes() {
        assert_eq!(Route::from_path("/"), Route::Home);
        assert_eq!(Route::from_path(""), Route::Home);
        assert_eq!(Route::from_path("/file-fir"), Route::FileReport);
        assert_eq!(Route::from_path("/status/"), Route::TrackStatus);
        assert_eq!(Route::from_path("/admin?tab=cases"), Route::Admin);
        assert_eq!(Route::from_path("/admin/users"), Route::NotFound);
        assert_eq!(Route::from_path("/unknown"), Route::NotFound);
        assert_eq!(Route::from_path("status"), Route::NotFound);
    }

    #[test]
    fn route_paths_round_trip() {
        for route in [Route::Home, Route::FileReport, Route::TrackStatus, Route::Admin] {
            let path = route.path().unwrap();
            assert_eq!(Route::from_path(path), route);
        }
        assert_eq!(Route::NotFound.path(), None);
    }

    #[test]
    fn busy_flag_is_exclusive_until_guard_drops() {
        let flag = BusyFlag::default();
        let guard = flag.try_acquire().unwrap();
        assert!(flag.is_busy());
        assert_eq!(flag.try_acquire().unwrap_err(), FirError::Busy);
        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_acquire().is_ok());
    }

    #[test]
    fn notice_display() {
        let notice = Notice::error("FIR Not Found", "Could not find FIR with the provided ID");
        assert!(notice.is_error());
        assert_eq!(
            notice.to_string(),
            "FIR Not Found: Could not find FIR with the provided ID"
        );
    }
}
