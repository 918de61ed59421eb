use std::fmt;

use crate::format::format_size;
use crate::model::case::InvalidTransition;
use crate::validate::ValidationError;

/// Machine-readable error codes surfaced to the CLI and notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    AlreadyInitialized,
    CaseNotFound,
    InvalidStateTransition,
    ValidationFailed,
    InvalidEnumValue,
    UploadTooLarge,
    CorruptSnapshot,
    WalletUnavailable,
    AccessDenied,
    RequestPending,
    SnapshotWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::AlreadyInitialized => "E1003",
            Self::CaseNotFound => "E2001",
            Self::InvalidStateTransition => "E2002",
            Self::ValidationFailed => "E2003",
            Self::InvalidEnumValue => "E2004",
            Self::UploadTooLarge => "E2005",
            Self::CorruptSnapshot => "E3001",
            Self::WalletUnavailable => "E4001",
            Self::AccessDenied => "E4002",
            Self::RequestPending => "E4003",
            Self::SnapshotWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Case directory not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::AlreadyInitialized => "Case directory already initialized",
            Self::CaseNotFound => "No matching record",
            Self::InvalidStateTransition => "Update rejected",
            Self::ValidationFailed => "Invalid input",
            Self::InvalidEnumValue => "Invalid category/stage value",
            Self::UploadTooLarge => "File too large",
            Self::CorruptSnapshot => "Corrupt case snapshot",
            Self::WalletUnavailable => "Wallet provider not available",
            Self::AccessDenied => "Access denied",
            Self::RequestPending => "Request already pending",
            Self::SnapshotWriteFailed => "Case snapshot write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users and operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `dfir init` to create the .dfir/ directory."),
            Self::ConfigParseError => Some("Fix syntax in .dfir/config.toml and retry."),
            Self::AlreadyInitialized => {
                Some("Use `dfir init --force` to rewrite the config; cases are kept.")
            }
            Self::CaseNotFound => Some("Check the FIR ID or wallet address and search again."),
            Self::InvalidStateTransition => Some(
                "Follow the lifecycle: filed -> acknowledged -> under review -> investigation -> resolved.",
            ),
            Self::ValidationFailed => Some("Correct the highlighted field and resubmit."),
            Self::InvalidEnumValue => Some("Use one of the documented category/stage names."),
            Self::UploadTooLarge => Some("Upload a smaller file or raise [evidence] max_bytes."),
            Self::CorruptSnapshot => Some("Restore .dfir/cases.json from a backup."),
            Self::WalletUnavailable => Some("Install a wallet provider and connect again."),
            Self::AccessDenied => {
                Some("Only authorized wallets can access the admin dashboard.")
            }
            Self::RequestPending => Some("Wait for the current request to finish."),
            Self::SnapshotWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Every recoverable failure a case operation can report.
///
/// None of these are fatal: page controllers turn each one into a
/// [`Notice`](crate::pages::Notice) and leave prior state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FirError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no case matches '{query}'")]
    NotFound { query: String },

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("evidence file is {size} bytes, limit is {limit} bytes")]
    UploadTooLarge { size: u64, limit: u64 },

    #[error("no wallet provider detected")]
    WalletUnavailable,

    #[error("wallet '{account}' is not authorized for this action")]
    AccessDenied { account: String },

    #[error("a request is already in flight")]
    Busy,

    #[error("case '{id}' failed integrity check: {reason}")]
    CorruptSnapshot { id: String, reason: String },
}

impl FirError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(err) if matches!(err.code, "invalid_category" | "invalid_stage") => {
                ErrorCode::InvalidEnumValue
            }
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::NotFound { .. } => ErrorCode::CaseNotFound,
            Self::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            Self::UploadTooLarge { .. } => ErrorCode::UploadTooLarge,
            Self::WalletUnavailable => ErrorCode::WalletUnavailable,
            Self::AccessDenied { .. } => ErrorCode::AccessDenied,
            Self::Busy => ErrorCode::RequestPending,
            Self::CorruptSnapshot { .. } => ErrorCode::CorruptSnapshot,
        }
    }

    /// Best remediation text: the validator's own suggestion when there is
    /// one, otherwise the code's generic hint.
    #[must_use]
    pub fn suggestion(&self) -> String {
        match self {
            Self::Validation(err) => err.suggestion.clone(),
            Self::UploadTooLarge { limit, .. } => {
                format!("Upload a file smaller than {}.", format_size(*limit))
            }
            other => other.code().hint().unwrap_or_default().to_string(),
        }
    }

    pub(crate) fn not_found(query: impl Into<String>) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }
}
