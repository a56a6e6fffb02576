//! The `ReviewStore` trait and its error type.
//!
//! The trait is the persistence seam the scheduling core talks through.
//! [`crate::db::SqliteStore`] is the shipped backend; tests substitute an
//! in-memory double. Higher layers depend on this abstraction, not on any
//! concrete backend.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{NewReview, Review, ReviewStatus};

/// Errors raised by a store backend. The core propagates these unchanged;
/// it has no recovery path for them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Abstraction over review persistence.
///
/// Absence is modeled with `Option`/empty vectors, never as an error used
/// for control flow. All write operations are single-record and
/// independently safe to retry.
pub trait ReviewStore {
    /// Persist a new review and return it with its assigned id.
    fn insert(&self, review: &NewReview) -> Result<Review, StoreError>;

    /// Idempotent upsert of a review's mutable fields
    /// (`scheduled_at`, `completed_at`, `status`), keyed by id.
    fn save(&self, review: &Review) -> Result<(), StoreError>;

    /// Pending reviews in `chain_id` with iteration strictly greater than
    /// `after_iteration`, ascending by iteration.
    fn find_pending_future_in_chain(
        &self,
        chain_id: &str,
        after_iteration: u32,
    ) -> Result<Vec<Review>, StoreError>;

    /// All reviews in `chain_id` with the given status, ascending by
    /// iteration.
    fn find_by_chain_and_status(
        &self,
        chain_id: &str,
        status: ReviewStatus,
    ) -> Result<Vec<Review>, StoreError>;

    /// Pending reviews scheduled at or before `cutoff`, ascending by
    /// scheduled instant.
    fn find_pending_due(&self, cutoff: DateTime<Utc>) -> Result<Vec<Review>, StoreError>;

    /// An existing pending review for the same problem, chain, and
    /// calendar day, if any. Used by registration to avoid scheduling the
    /// same day twice within a chain.
    fn check_duplicate(
        &self,
        problem_id: &str,
        day: NaiveDate,
        chain_id: &str,
    ) -> Result<Option<Review>, StoreError>;
}
