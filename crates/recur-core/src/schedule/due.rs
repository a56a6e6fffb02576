//! Due selection: which pending reviews belong to today's queue.

use chrono::{DateTime, Utc};

use crate::datetime;
use crate::error::CoreError;
use crate::model::Review;
use crate::store::ReviewStore;

/// Pending reviews scheduled on or before the end of the reference
/// instant's **local** calendar day, ascending by scheduled instant.
///
/// The boundary is computed in the caller's local timezone and converted
/// back to UTC for the storage comparison, so the queue follows the local
/// calendar day rather than the UTC one.
///
/// # Errors
///
/// Store errors propagated unchanged.
pub fn due_as_of<S: ReviewStore>(
    store: &S,
    reference: DateTime<Utc>,
) -> Result<Vec<Review>, CoreError> {
    let cutoff = datetime::local_day_end_utc(reference);
    Ok(store.find_pending_due(cutoff)?)
}
