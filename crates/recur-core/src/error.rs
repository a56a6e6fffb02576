use std::fmt;

use crate::store::StoreError;

/// Machine-readable error codes for script-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidIntervalTable,
    InvalidDate,
    InvalidProblemInput,
    InvalidReviewCount,
    ProblemNotFound,
    ReviewNotFound,
    InvalidStateTransition,
    MissingCompletionTime,
    DuplicateReview,
    StoreFailure,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidIntervalTable => "E1002",
            Self::InvalidDate => "E2001",
            Self::InvalidProblemInput => "E2002",
            Self::InvalidReviewCount => "E2003",
            Self::ProblemNotFound => "E2004",
            Self::ReviewNotFound => "E2005",
            Self::InvalidStateTransition => "E2006",
            Self::MissingCompletionTime => "E2007",
            Self::DuplicateReview => "E2008",
            Self::StoreFailure => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidIntervalTable => "Invalid interval table",
            Self::InvalidDate => "Invalid date",
            Self::InvalidProblemInput => "Invalid problem input",
            Self::InvalidReviewCount => "Invalid review count",
            Self::ProblemNotFound => "Problem not found",
            Self::ReviewNotFound => "Review not found",
            Self::InvalidStateTransition => "Invalid state transition",
            Self::MissingCompletionTime => "Missing completion timestamp",
            Self::DuplicateReview => "Duplicate review for day",
            Self::StoreFailure => "Database operation failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in the recur config.toml and retry."),
            Self::InvalidIntervalTable => {
                Some("Check [intervals]: base must be positive days, jitter in 0..=1, min <= max.")
            }
            Self::InvalidDate => {
                Some("Use one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, MM-DD-YYYY.")
            }
            Self::InvalidProblemInput => {
                Some("Expected formats: '1', '1. Two Sum', or '(E) 1. Two Sum'.")
            }
            Self::InvalidReviewCount => Some("Request at least one review."),
            Self::ProblemNotFound => Some("Register the problem with `rq add` first."),
            Self::ReviewNotFound => None,
            Self::InvalidStateTransition => {
                Some("Reviews only move pending -> completed, never back.")
            }
            Self::MissingCompletionTime => None,
            Self::DuplicateReview => Some("A pending review already exists for that day."),
            Self::StoreFailure => Some("Check the database file and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by the scheduling core.
///
/// Every variant is a precondition violation reported to the caller; the
/// core has no transient-failure notion and never retries internally.
/// Store errors pass through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Interval-table or config parameters are unusable. Fatal at
    /// construction; the caller should not proceed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Bad call-site input. The caller fixes the call; not retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation on a record in the wrong lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A required field is absent.
    #[error("missing data: {0}")]
    MissingData(String),

    /// Persistence-collaborator failure, propagated unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Map to the stable machine code used by the CLI JSON envelope.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfiguration(_) => ErrorCode::InvalidIntervalTable,
            Self::InvalidArgument(_) => ErrorCode::InvalidReviewCount,
            Self::InvalidState(_) => ErrorCode::InvalidStateTransition,
            Self::MissingData(_) => ErrorCode::MissingCompletionTime,
            Self::Store(StoreError::NotFound(_)) => ErrorCode::ReviewNotFound,
            Self::Store(_) => ErrorCode::StoreFailure,
        }
    }
}
