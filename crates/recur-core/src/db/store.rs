//! `SqliteStore`: the shipped [`ReviewStore`] backend, plus the
//! registration and reporting queries the CLI layer needs.
//!
//! All functions return typed structs (never raw rows); absence is
//! `Option`, not an error.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use rusqlite::{Connection, Row, params, types::Type};
use tracing::debug;

use crate::datetime;
use crate::model::{Difficulty, NewReview, Problem, Review, ReviewStatus, Session, SessionStatus};
use crate::store::{ReviewStore, StoreError};

const REVIEW_COLUMNS: &str = "review_id, problem_id, chain_id, iteration, scheduled_at_us, \
     completed_at_us, status, created_at_us, updated_at_us";

const SESSION_COLUMNS: &str = "session_id, problem_id, started_at_us, ended_at_us, \
     duration_secs, status, created_at_us, updated_at_us";

/// SQLite-backed review store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and migrate it.
    ///
    /// # Errors
    ///
    /// Returns an error if opening/configuring/migrating fails.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            conn: super::open_connection(path)?,
        })
    }

    /// Fully-migrated in-memory store; used by tests.
    ///
    /// # Errors
    ///
    /// Returns an error if configuring or migrating fails.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: super::open_in_memory()?,
        })
    }

    // ── Problems ──────────────────────────────────────────────────────

    /// Fetch a problem by id. Returns `None` when unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_problem(&self, problem_id: &str) -> Result<Option<Problem>, StoreError> {
        let result = self.conn.query_row(
            "SELECT problem_id, title, difficulty, created_at_us, updated_at_us
             FROM problems WHERE problem_id = ?1",
            params![problem_id],
            row_to_problem,
        );
        match result {
            Ok(problem) => Ok(Some(problem)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch an existing problem or register a new one. A provided title
    /// or difficulty refreshes the stored value; identity never changes.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or write fails.
    pub fn get_or_create_problem(
        &self,
        problem_id: &str,
        title: Option<&str>,
        difficulty: Option<Difficulty>,
    ) -> Result<Problem, StoreError> {
        let now = now_stamp();

        if let Some(mut existing) = self.get_problem(problem_id)? {
            let mut changed = false;
            if let Some(new_title) = title {
                if existing.title.as_deref() != Some(new_title) {
                    existing.title = Some(new_title.to_string());
                    changed = true;
                }
            }
            if let Some(new_difficulty) = difficulty {
                if existing.difficulty != Some(new_difficulty) {
                    existing.difficulty = Some(new_difficulty);
                    changed = true;
                }
            }
            if changed {
                existing.updated_at = now;
                self.conn.execute(
                    "UPDATE problems SET title = ?1, difficulty = ?2, updated_at_us = ?3
                     WHERE problem_id = ?4",
                    params![
                        existing.title,
                        existing.difficulty.map(Difficulty::as_str),
                        us(now),
                        problem_id
                    ],
                )?;
            }
            return Ok(existing);
        }

        self.conn.execute(
            "INSERT INTO problems (problem_id, title, difficulty, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                problem_id,
                title,
                difficulty.map(Difficulty::as_str),
                us(now)
            ],
        )?;
        debug!(problem = problem_id, "registered problem");

        Ok(Problem {
            problem_id: problem_id.to_string(),
            title: title.map(ToString::to_string),
            difficulty,
            created_at: now,
            updated_at: now,
        })
    }

    // ── Review reporting queries ──────────────────────────────────────

    /// Earliest pending review for a problem, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn earliest_pending_for_problem(
        &self,
        problem_id: &str,
    ) -> Result<Option<Review>, StoreError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE problem_id = ?1 AND status = 'pending'
             ORDER BY scheduled_at_us ASC LIMIT 1"
        );
        let result = self.conn.query_row(&sql, params![problem_id], row_to_review);
        match result {
            Ok(review) => Ok(Some(review)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Completed reviews whose completion instant falls in
    /// `[start, end]`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Review>, StoreError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE status = 'completed'
               AND completed_at_us >= ?1 AND completed_at_us <= ?2
             ORDER BY completed_at_us DESC"
        );
        self.query_reviews(&sql, params![us(start), us(end)])
    }

    /// Pending reviews scheduled in `[start, end]`, soonest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn pending_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Review>, StoreError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE status = 'pending'
               AND scheduled_at_us >= ?1 AND scheduled_at_us <= ?2
             ORDER BY scheduled_at_us ASC"
        );
        self.query_reviews(&sql, params![us(start), us(end)])
    }

    /// The most recently created chain for a problem, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn latest_chain_id(&self, problem_id: &str) -> Result<Option<String>, StoreError> {
        let result = self.conn.query_row(
            "SELECT chain_id FROM reviews
             WHERE problem_id = ?1
             ORDER BY created_at_us DESC, review_id DESC LIMIT 1",
            params![problem_id],
            |row| row.get(0),
        );
        match result {
            Ok(chain_id) => Ok(Some(chain_id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Sessions ──────────────────────────────────────────────────────

    /// Start a session for a problem at `started_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn create_session(
        &self,
        problem_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let now = now_stamp();
        self.conn.execute(
            "INSERT INTO sessions (problem_id, started_at_us, status, created_at_us, updated_at_us)
             VALUES (?1, ?2, 'active', ?3, ?3)",
            params![problem_id, us(started_at), us(now)],
        )?;

        Ok(Session {
            id: self.conn.last_insert_rowid(),
            problem_id: problem_id.to_string(),
            started_at,
            ended_at: None,
            duration_secs: None,
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// The active session for a problem, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn active_session_for_problem(
        &self,
        problem_id: &str,
    ) -> Result<Option<Session>, StoreError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE problem_id = ?1 AND status = 'active'
             ORDER BY started_at_us DESC LIMIT 1"
        );
        let result = self.conn.query_row(&sql, params![problem_id], row_to_session);
        match result {
            Ok(session) => Ok(Some(session)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a session's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no row matches the id.
    pub fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE sessions
             SET ended_at_us = ?1, duration_secs = ?2, status = ?3, updated_at_us = ?4
             WHERE session_id = ?5",
            params![
                session.ended_at.map(us),
                session.duration_secs,
                session.status.as_str(),
                us(now_stamp()),
                session.id
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("session {}", session.id)));
        }
        Ok(())
    }

    fn query_reviews(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Review>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_review)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl ReviewStore for SqliteStore {
    fn insert(&self, review: &NewReview) -> Result<Review, StoreError> {
        let now = now_stamp();
        self.conn.execute(
            "INSERT INTO reviews (problem_id, chain_id, iteration, scheduled_at_us,
                                  status, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?5)",
            params![
                review.problem_id,
                review.chain_id,
                review.iteration,
                us(review.scheduled_at),
                us(now)
            ],
        )?;

        Ok(Review {
            id: self.conn.last_insert_rowid(),
            problem_id: review.problem_id.clone(),
            chain_id: review.chain_id.clone(),
            iteration: review.iteration,
            scheduled_at: review.scheduled_at,
            completed_at: None,
            status: ReviewStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    fn save(&self, review: &Review) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE reviews
             SET scheduled_at_us = ?1, completed_at_us = ?2, status = ?3, updated_at_us = ?4
             WHERE review_id = ?5",
            params![
                us(review.scheduled_at),
                review.completed_at.map(us),
                review.status.as_str(),
                us(now_stamp()),
                review.id
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("review {}", review.id)));
        }
        Ok(())
    }

    fn find_pending_future_in_chain(
        &self,
        chain_id: &str,
        after_iteration: u32,
    ) -> Result<Vec<Review>, StoreError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE chain_id = ?1 AND status = 'pending' AND iteration > ?2
             ORDER BY iteration ASC"
        );
        self.query_reviews(&sql, params![chain_id, after_iteration])
    }

    fn find_by_chain_and_status(
        &self,
        chain_id: &str,
        status: ReviewStatus,
    ) -> Result<Vec<Review>, StoreError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE chain_id = ?1 AND status = ?2
             ORDER BY iteration ASC"
        );
        self.query_reviews(&sql, params![chain_id, status.as_str()])
    }

    fn find_pending_due(&self, cutoff: DateTime<Utc>) -> Result<Vec<Review>, StoreError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE status = 'pending' AND scheduled_at_us <= ?1
             ORDER BY scheduled_at_us ASC"
        );
        self.query_reviews(&sql, params![us(cutoff)])
    }

    fn check_duplicate(
        &self,
        problem_id: &str,
        day: NaiveDate,
        chain_id: &str,
    ) -> Result<Option<Review>, StoreError> {
        let (start, end) = datetime::utc_day_bounds(day);
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE problem_id = ?1 AND chain_id = ?2 AND status = 'pending'
               AND scheduled_at_us >= ?3 AND scheduled_at_us < ?4
             LIMIT 1"
        );
        let result = self.conn.query_row(
            &sql,
            params![problem_id, chain_id, us(start), us(end)],
            row_to_review,
        );
        match result {
            Ok(review) => Ok(Some(review)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// ── Row mapping ───────────────────────────────────────────────────────

fn us(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_micros()
}

/// Current instant truncated to the stored microsecond precision, so
/// returned entities compare equal to their re-read rows.
fn now_stamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn datetime_from_us(index: usize, micros: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(index, micros))
}

fn row_to_problem(row: &Row<'_>) -> rusqlite::Result<Problem> {
    let difficulty: Option<String> = row.get(2)?;
    let difficulty = difficulty
        .map(|raw| {
            Difficulty::from_str(&raw).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(error))
            })
        })
        .transpose()?;

    Ok(Problem {
        problem_id: row.get(0)?,
        title: row.get(1)?,
        difficulty,
        created_at: datetime_from_us(3, row.get(3)?)?,
        updated_at: datetime_from_us(4, row.get(4)?)?,
    })
}

fn row_to_review(row: &Row<'_>) -> rusqlite::Result<Review> {
    let status: String = row.get(6)?;
    let status = ReviewStatus::from_str(&status).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(error))
    })?;
    let completed_at: Option<i64> = row.get(5)?;

    Ok(Review {
        id: row.get(0)?,
        problem_id: row.get(1)?,
        chain_id: row.get(2)?,
        iteration: row.get(3)?,
        scheduled_at: datetime_from_us(4, row.get(4)?)?,
        completed_at: completed_at.map(|raw| datetime_from_us(5, raw)).transpose()?,
        status,
        created_at: datetime_from_us(7, row.get(7)?)?,
        updated_at: datetime_from_us(8, row.get(8)?)?,
    })
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<Session> {
    let status: String = row.get(5)?;
    let status = SessionStatus::from_str(&status).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(error))
    })?;
    let ended_at: Option<i64> = row.get(3)?;

    Ok(Session {
        id: row.get(0)?,
        problem_id: row.get(1)?,
        started_at: datetime_from_us(2, row.get(2)?)?,
        ended_at: ended_at.map(|raw| datetime_from_us(3, raw)).transpose()?,
        duration_secs: row.get(4)?,
        status,
        created_at: datetime_from_us(6, row.get(6)?)?,
        updated_at: datetime_from_us(7, row.get(7)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::SqliteStore;
    use crate::model::{Difficulty, NewReview, ReviewStatus};
    use crate::store::{ReviewStore, StoreError};
    use chrono::{Duration, TimeZone, Utc};

    fn store_with_problem(problem_id: &str) -> SqliteStore {
        let store = SqliteStore::open_in_memory().expect("open in-memory store");
        store
            .get_or_create_problem(problem_id, None, None)
            .expect("create problem");
        store
    }

    fn new_review(problem_id: &str, chain_id: &str, iteration: u32, days: i64) -> NewReview {
        NewReview {
            problem_id: problem_id.to_string(),
            chain_id: chain_id.to_string(),
            iteration,
            scheduled_at: Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap() + Duration::days(days),
        }
    }

    #[test]
    fn insert_assigns_ids_and_round_trips() {
        let store = store_with_problem("1");
        let inserted = store.insert(&new_review("1", "1-c", 1, 0)).unwrap();
        assert!(inserted.id > 0);
        assert_eq!(inserted.status, ReviewStatus::Pending);

        let found = store.find_pending_future_in_chain("1-c", 0).unwrap();
        assert_eq!(found, vec![inserted]);
    }

    #[test]
    fn save_updates_mutable_fields() {
        let store = store_with_problem("1");
        let inserted = store.insert(&new_review("1", "1-c", 1, 0)).unwrap();

        let completed = inserted
            .clone()
            .complete(inserted.scheduled_at + Duration::days(2))
            .unwrap();
        store.save(&completed).unwrap();

        assert!(store.find_pending_future_in_chain("1-c", 0).unwrap().is_empty());
        let done = store
            .find_by_chain_and_status("1-c", ReviewStatus::Completed)
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].completed_at, completed.completed_at);
    }

    #[test]
    fn save_unknown_review_is_not_found() {
        let store = store_with_problem("1");
        let mut ghost = store.insert(&new_review("1", "1-c", 1, 0)).unwrap();
        ghost.id = 9999;
        assert!(matches!(store.save(&ghost), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn future_in_chain_is_filtered_and_ordered() {
        let store = store_with_problem("1");
        // Insert out of order to exercise the ORDER BY.
        store.insert(&new_review("1", "1-c", 3, 18)).unwrap();
        store.insert(&new_review("1", "1-c", 1, 0)).unwrap();
        store.insert(&new_review("1", "1-c", 2, 7)).unwrap();
        store.insert(&new_review("1", "other", 5, 3)).unwrap();

        let future = store.find_pending_future_in_chain("1-c", 1).unwrap();
        let iterations: Vec<u32> = future.iter().map(|r| r.iteration).collect();
        assert_eq!(iterations, vec![2, 3]);
    }

    #[test]
    fn pending_due_is_ordered_by_scheduled_instant() {
        let store = store_with_problem("1");
        let r2 = store.insert(&new_review("1", "1-c", 2, 7)).unwrap();
        let r1 = store.insert(&new_review("1", "1-c", 1, 0)).unwrap();
        store.insert(&new_review("1", "1-c", 3, 18)).unwrap();

        let due = store
            .find_pending_due(r2.scheduled_at + Duration::hours(1))
            .unwrap();
        let ids: Vec<i64> = due.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![r1.id, r2.id]);
    }

    #[test]
    fn duplicate_check_matches_same_utc_day_only() {
        let store = store_with_problem("1");
        let inserted = store.insert(&new_review("1", "1-c", 1, 0)).unwrap();
        let day = inserted.scheduled_at.date_naive();

        let duplicate = store.check_duplicate("1", day, "1-c").unwrap();
        assert_eq!(duplicate.map(|r| r.id), Some(inserted.id));

        assert!(store
            .check_duplicate("1", day + Duration::days(1), "1-c")
            .unwrap()
            .is_none());
        assert!(store.check_duplicate("1", day, "other").unwrap().is_none());
    }

    #[test]
    fn reregistration_refreshes_title_and_difficulty() {
        let store = store_with_problem("42");
        let updated = store
            .get_or_create_problem("42", Some("Trapping Rain Water"), Some(Difficulty::Hard))
            .unwrap();
        assert_eq!(updated.title.as_deref(), Some("Trapping Rain Water"));
        assert_eq!(updated.difficulty, Some(Difficulty::Hard));

        let fetched = store.get_problem("42").unwrap().expect("problem exists");
        assert_eq!(fetched.title.as_deref(), Some("Trapping Rain Water"));
        assert_eq!(fetched.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn earliest_pending_picks_soonest_schedule() {
        let store = store_with_problem("1");
        store.insert(&new_review("1", "1-c", 2, 7)).unwrap();
        let first = store.insert(&new_review("1", "1-c", 1, 0)).unwrap();

        let earliest = store.earliest_pending_for_problem("1").unwrap();
        assert_eq!(earliest.map(|r| r.id), Some(first.id));

        assert!(store.earliest_pending_for_problem("404").unwrap().is_none());
    }

    #[test]
    fn latest_chain_id_tracks_most_recent_registration() {
        let store = store_with_problem("1");
        store.insert(&new_review("1", "chain-a", 1, 0)).unwrap();
        store.insert(&new_review("1", "chain-b", 1, 1)).unwrap();

        let latest = store.latest_chain_id("1").unwrap();
        assert_eq!(latest.as_deref(), Some("chain-b"));
        assert!(store.latest_chain_id("404").unwrap().is_none());
    }

    #[test]
    fn session_lifecycle_round_trips() {
        let store = store_with_problem("1");
        let started = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();

        let session = store.create_session("1", started).unwrap();
        let active = store.active_session_for_problem("1").unwrap();
        assert_eq!(active.as_ref().map(|s| s.id), Some(session.id));

        let ended = session.end(started + Duration::seconds(300));
        store.save_session(&ended).unwrap();

        assert!(store.active_session_for_problem("1").unwrap().is_none());
    }
}
