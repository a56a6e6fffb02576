use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::datetime;
use crate::error::CoreError;
use crate::model::problem::ParseEnumError;

/// The two lifecycle states of a review. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Completed,
}

impl ReviewStatus {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "review status",
                got: s.to_string(),
            }),
        }
    }
}

/// Creation payload for a review; the store assigns the row id and
/// bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub problem_id: String,
    pub chain_id: String,
    pub iteration: u32,
    pub scheduled_at: DateTime<Utc>,
}

/// A scheduled or completed review.
///
/// `scheduled_at` may be rewritten by the delay cascade only while the
/// review is pending; completion freezes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub problem_id: String,
    pub chain_id: String,
    /// Position within the chain's ladder. 0 is reserved for ad-hoc or
    /// orphan entries; generated ladders use 1..=N.
    pub iteration: u32,
    pub scheduled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Mark this review completed at `now`, returning the updated entity.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidState`] if the review is already
    /// completed; there is no transition back.
    pub fn complete(mut self, now: DateTime<Utc>) -> Result<Self, CoreError> {
        if self.status == ReviewStatus::Completed {
            return Err(CoreError::InvalidState(format!(
                "review {} is already completed",
                self.id
            )));
        }
        self.status = ReviewStatus::Completed;
        self.completed_at = Some(now);
        Ok(self)
    }

    /// Days this review was completed late, floored at zero.
    /// Pending reviews contribute zero.
    #[must_use]
    pub fn delay_days(&self) -> i64 {
        self.completed_at
            .map_or(0, |done| datetime::days_late(self.scheduled_at, done))
    }

    /// Whether this review is pending and past its scheduled instant.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == ReviewStatus::Pending && now > self.scheduled_at
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ReviewStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::{Review, ReviewStatus};
    use chrono::{Duration, TimeZone, Utc};
    use std::str::FromStr;

    fn pending_review() -> Review {
        let scheduled = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        Review {
            id: 7,
            problem_id: "215".to_string(),
            chain_id: "215-1710000000".to_string(),
            iteration: 2,
            scheduled_at: scheduled,
            completed_at: None,
            status: ReviewStatus::Pending,
            created_at: scheduled - Duration::days(7),
            updated_at: scheduled - Duration::days(7),
        }
    }

    #[test]
    fn status_display_parse_roundtrips() {
        for status in [ReviewStatus::Pending, ReviewStatus::Completed] {
            let rendered = status.to_string();
            assert_eq!(ReviewStatus::from_str(&rendered).unwrap(), status);
        }
        assert!(ReviewStatus::from_str("done").is_err());
    }

    #[test]
    fn complete_sets_completion_instant() {
        let review = pending_review();
        let now = review.scheduled_at + Duration::days(3);

        let completed = review.complete(now).unwrap();
        assert_eq!(completed.status, ReviewStatus::Completed);
        assert_eq!(completed.completed_at, Some(now));
        assert_eq!(completed.delay_days(), 3);
    }

    #[test]
    fn complete_twice_is_rejected() {
        let review = pending_review();
        let now = review.scheduled_at;
        let completed = review.complete(now).unwrap();
        assert!(completed.complete(now).is_err());
    }

    #[test]
    fn delay_is_zero_for_early_or_on_time_completion() {
        let review = pending_review();
        let early = review.scheduled_at - Duration::days(2);

        let completed = review.clone().complete(early).unwrap();
        assert_eq!(completed.delay_days(), 0);

        let on_time = review.clone().complete(review.scheduled_at).unwrap();
        assert_eq!(on_time.delay_days(), 0);
    }

    #[test]
    fn pending_review_has_zero_delay() {
        assert_eq!(pending_review().delay_days(), 0);
    }

    #[test]
    fn overdue_depends_on_now() {
        let review = pending_review();
        assert!(!review.is_overdue(review.scheduled_at));
        assert!(review.is_overdue(review.scheduled_at + Duration::hours(1)));

        let completed = review.clone().complete(review.scheduled_at).unwrap();
        assert!(!completed.is_overdue(completed.scheduled_at + Duration::days(9)));
    }
}
