use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::model::problem::ParseEnumError;

/// Lifecycle of a timed practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "session status",
                got: s.to_string(),
            }),
        }
    }
}

/// A timed problem-solving session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub problem_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Stop the timer at `now`, returning the updated entity.
    /// Ending an already-completed session keeps the original duration.
    #[must_use]
    pub fn end(mut self, now: DateTime<Utc>) -> Self {
        if self.status == SessionStatus::Completed {
            return self;
        }
        self.ended_at = Some(now);
        self.duration_secs = Some((now - self.started_at).num_seconds().max(0));
        self.status = SessionStatus::Completed;
        self
    }

    /// Seconds elapsed: stored duration for completed sessions, time since
    /// start for active ones.
    #[must_use]
    pub fn current_duration_secs(&self, now: DateTime<Utc>) -> i64 {
        match self.status {
            SessionStatus::Completed => self.duration_secs.unwrap_or(0),
            SessionStatus::Active => (now - self.started_at).num_seconds().max(0),
        }
    }

    /// Human-readable duration, e.g. `1h 23m` or `45m 30s`.
    #[must_use]
    pub fn format_duration(&self) -> String {
        let total = self.duration_secs.unwrap_or(0);
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        let mut parts = Vec::new();
        if hours > 0 {
            parts.push(format!("{hours}h"));
        }
        if minutes > 0 {
            parts.push(format!("{minutes}m"));
        }
        if seconds > 0 || parts.is_empty() {
            parts.push(format!("{seconds}s"));
        }
        parts.join(" ")
    }
}
