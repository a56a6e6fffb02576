//! Schedule generation: turning the interval ladder into concrete dates.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::error::CoreError;
use crate::schedule::intervals::IntervalTable;

/// Generates review schedules from an [`IntervalTable`].
///
/// Pure apart from the injected random source; persisting the resulting
/// instants as review records is the caller's responsibility.
#[derive(Debug, Clone)]
pub struct Scheduler {
    table: IntervalTable,
}

impl Scheduler {
    #[must_use]
    pub const fn new(table: IntervalTable) -> Self {
        Self { table }
    }

    #[must_use]
    pub const fn table(&self) -> &IntervalTable {
        &self.table
    }

    /// Generate `count` future review instants starting from `start`.
    ///
    /// The result is strictly increasing: every interval is at least one
    /// day.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if `count` is zero.
    pub fn schedule<R: Rng>(
        &self,
        start: DateTime<Utc>,
        count: u32,
        jitter_enabled: bool,
        rng: &mut R,
    ) -> Result<Vec<DateTime<Utc>>, CoreError> {
        if count < 1 {
            return Err(CoreError::InvalidArgument(
                "review count must be at least 1".to_string(),
            ));
        }

        let mut schedule = Vec::with_capacity(count as usize);
        let mut current = start;
        for iteration in 0..count {
            let interval = self.table.interval_for(iteration, jitter_enabled, rng);
            current += Duration::days(i64::from(interval));
            schedule.push(current);
        }
        Ok(schedule)
    }

    /// The single next review instant after `last`, for the given
    /// iteration index.
    #[must_use]
    pub fn next_after<R: Rng>(
        &self,
        last: DateTime<Utc>,
        iteration: u32,
        jitter_enabled: bool,
        rng: &mut R,
    ) -> DateTime<Utc> {
        let interval = self.table.interval_for(iteration, jitter_enabled, rng);
        last + Duration::days(i64::from(interval))
    }
}
