//! The scheduling engine: interval ladder, schedule generation, delay
//! cascade, and due selection.

pub mod cascade;
pub mod due;
pub mod generator;
pub mod intervals;

pub use cascade::{CascadeShift, ChainStats};
pub use generator::Scheduler;
pub use intervals::IntervalTable;
