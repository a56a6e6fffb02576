//! Delay cascade: when a review is completed late, every later pending
//! review in the same chain is pushed forward by the same number of whole
//! days, preserving the relative spacing of the ladder.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::datetime;
use crate::error::CoreError;
use crate::model::{Review, ReviewStatus};
use crate::store::ReviewStore;

/// One planned (or applied) shift of a future review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeShift {
    pub review_id: i64,
    pub iteration: u32,
    pub old_date: DateTime<Utc>,
    pub new_date: DateTime<Utc>,
    pub delay_days: i64,
}

/// Aggregate delay statistics over one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ChainStats {
    pub total_reviews: usize,
    pub completed_reviews: usize,
    pub pending_reviews: usize,
    pub total_delay_days: i64,
    pub average_delay_days: f64,
    pub max_delay_days: i64,
    pub reviews_with_delay: usize,
}

/// Outcome of completing a review and cascading its delay.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub review: Review,
    pub delay_days: i64,
    pub updated_count: usize,
}

/// Days `actual` landed after `scheduled`, floored at zero.
#[must_use]
pub fn delay_days(scheduled: DateTime<Utc>, actual: DateTime<Utc>) -> i64 {
    datetime::days_late(scheduled, actual)
}

/// Single source of shift truth shared by `apply` and `preview`: the
/// delay and, when nonzero, every future pending sibling with its shifted
/// schedule already applied in memory.
fn plan<S: ReviewStore>(
    store: &S,
    review: &Review,
    completed_at: DateTime<Utc>,
) -> Result<(i64, Vec<(Review, CascadeShift)>), CoreError> {
    let delay = delay_days(review.scheduled_at, completed_at);
    if delay == 0 {
        return Ok((0, Vec::new()));
    }

    let siblings = store.find_pending_future_in_chain(&review.chain_id, review.iteration)?;
    let planned = siblings
        .into_iter()
        .map(|mut sibling| {
            let old_date = sibling.scheduled_at;
            let new_date = old_date + Duration::days(delay);
            sibling.scheduled_at = new_date;
            let shift = CascadeShift {
                review_id: sibling.id,
                iteration: sibling.iteration,
                old_date,
                new_date,
                delay_days: delay,
            };
            (sibling, shift)
        })
        .collect();

    Ok((delay, planned))
}

/// Shift every later pending review in the chain by the completed
/// review's delay. Returns the number of records updated.
///
/// Records are saved one at a time; each update is independently safe to
/// retry and none depends on an earlier update in the loop.
///
/// # Errors
///
/// [`CoreError::InvalidState`] if `review` is not completed,
/// [`CoreError::MissingData`] if no completion instant is available, and
/// store errors propagated unchanged.
pub fn apply<S: ReviewStore>(
    store: &S,
    review: &Review,
    completed_at: Option<DateTime<Utc>>,
) -> Result<usize, CoreError> {
    let at = completed_at.or(review.completed_at).ok_or_else(|| {
        CoreError::MissingData("review must have a completion instant".to_string())
    })?;
    if review.status != ReviewStatus::Completed {
        return Err(CoreError::InvalidState(
            "review must be completed before applying cascade".to_string(),
        ));
    }

    let (delay, planned) = plan(store, review, at)?;
    if delay == 0 {
        debug!(review = review.id, "completion on time, no cascade");
        return Ok(0);
    }

    let mut updated = 0;
    for (record, shift) in planned {
        store.save(&record)?;
        debug!(
            review = record.id,
            iteration = record.iteration,
            old = %shift.old_date,
            new = %shift.new_date,
            "shifted future review"
        );
        updated += 1;
    }

    info!(
        chain = %review.chain_id,
        delay_days = delay,
        updated,
        "applied delay cascade"
    );
    Ok(updated)
}

/// Dry-run of [`apply`]: the same shifts, computed with the same code,
/// persisted nowhere. An absent completion instant yields no shifts.
///
/// # Errors
///
/// Store errors propagated unchanged.
pub fn preview<S: ReviewStore>(
    store: &S,
    review: &Review,
    completed_at: Option<DateTime<Utc>>,
) -> Result<Vec<CascadeShift>, CoreError> {
    let Some(at) = completed_at.or(review.completed_at) else {
        return Ok(Vec::new());
    };

    let (_, planned) = plan(store, review, at)?;
    Ok(planned.into_iter().map(|(_, shift)| shift).collect())
}

/// Complete a pending review at `now`, persist it, and cascade its delay.
///
/// # Errors
///
/// [`CoreError::InvalidState`] if the review is already completed, plus
/// anything [`apply`] can return.
pub fn complete_and_cascade<S: ReviewStore>(
    store: &S,
    review: Review,
    now: DateTime<Utc>,
) -> Result<CompletionOutcome, CoreError> {
    let completed = review.complete(now)?;
    store.save(&completed)?;

    let delay = completed.delay_days();
    let updated = if delay > 0 {
        apply(store, &completed, Some(now))?
    } else {
        0
    };

    Ok(CompletionOutcome {
        review: completed,
        delay_days: delay,
        updated_count: updated,
    })
}

/// Sum of completed reviews' delays across a chain.
///
/// # Errors
///
/// Store errors propagated unchanged.
pub fn total_chain_delay<S: ReviewStore>(store: &S, chain_id: &str) -> Result<i64, CoreError> {
    let completed = store.find_by_chain_and_status(chain_id, ReviewStatus::Completed)?;
    Ok(completed
        .iter()
        .filter(|review| review.completed_at.is_some())
        .map(Review::delay_days)
        .sum())
}

/// Aggregate delay statistics for a chain. An empty chain yields all-zero
/// aggregates; the mean's denominator counts only completed reviews.
///
/// # Errors
///
/// Store errors propagated unchanged.
pub fn chain_statistics<S: ReviewStore>(
    store: &S,
    chain_id: &str,
) -> Result<ChainStats, CoreError> {
    let completed = store.find_by_chain_and_status(chain_id, ReviewStatus::Completed)?;
    let pending = store.find_by_chain_and_status(chain_id, ReviewStatus::Pending)?;

    let delays: Vec<i64> = completed
        .iter()
        .filter(|review| review.completed_at.is_some())
        .map(Review::delay_days)
        .collect();

    let total_delay: i64 = delays.iter().sum();
    let average = if delays.is_empty() {
        0.0
    } else {
        total_delay as f64 / delays.len() as f64
    };

    Ok(ChainStats {
        total_reviews: completed.len() + pending.len(),
        completed_reviews: completed.len(),
        pending_reviews: pending.len(),
        total_delay_days: total_delay,
        average_delay_days: average,
        max_delay_days: delays.iter().copied().max().unwrap_or(0),
        reviews_with_delay: delays.iter().filter(|&&d| d > 0).count(),
    })
}
