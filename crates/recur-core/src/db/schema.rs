//! Canonical SQLite schema for the review store.
//!
//! Normalized for queryability:
//! - `problems` holds one row per registered problem
//! - `reviews` holds every scheduled/completed review, grouped into chains
//! - `sessions` holds timed practice sessions
//!
//! Instants are stored as UTC microseconds (`*_at_us`); enumerations are
//! CHECKed TEXT columns.

/// Migration v1: core tables.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS problems (
    problem_id TEXT PRIMARY KEY,
    title TEXT,
    difficulty TEXT CHECK (difficulty IS NULL OR difficulty IN ('E', 'M', 'H')),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS reviews (
    review_id INTEGER PRIMARY KEY AUTOINCREMENT,
    problem_id TEXT NOT NULL REFERENCES problems(problem_id) ON DELETE CASCADE,
    chain_id TEXT NOT NULL,
    iteration INTEGER NOT NULL DEFAULT 1 CHECK (iteration >= 0),
    scheduled_at_us INTEGER NOT NULL,
    completed_at_us INTEGER,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'completed')),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id INTEGER PRIMARY KEY AUTOINCREMENT,
    problem_id TEXT NOT NULL REFERENCES problems(problem_id) ON DELETE CASCADE,
    started_at_us INTEGER NOT NULL,
    ended_at_us INTEGER,
    duration_secs INTEGER,
    status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'completed')),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);
";

/// Migration v2: read-path indexes.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_reviews_problem_status_scheduled
    ON reviews(problem_id, status, scheduled_at_us);

CREATE INDEX IF NOT EXISTS idx_reviews_chain_iteration
    ON reviews(chain_id, iteration);

CREATE INDEX IF NOT EXISTS idx_reviews_status_scheduled
    ON reviews(status, scheduled_at_us);

CREATE INDEX IF NOT EXISTS idx_sessions_problem_status
    ON sessions(problem_id, status);
";

/// Index names asserted by the migration tests.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_reviews_problem_status_scheduled",
    "idx_reviews_chain_iteration",
    "idx_reviews_status_scheduled",
    "idx_sessions_problem_status",
];
