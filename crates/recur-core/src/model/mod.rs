//! Persisted entities: problems, reviews, and practice sessions.

pub mod problem;
pub mod review;
pub mod session;

pub use problem::{Difficulty, Problem};
pub use review::{NewReview, Review, ReviewStatus};
pub use session::{Session, SessionStatus};
