//! recur-core: data model, scheduling engine, and delay cascade.
//!
//! The CLI crate depends on this; this crate depends only on the storage
//! and utility libraries it needs (rusqlite, chrono, rand).
//!
//! # Conventions
//!
//! - **Errors**: typed [`error::CoreError`] in the domain, `anyhow::Result`
//!   at I/O edges (config loading, database opening).
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Time**: all stored instants are UTC; conversion to the local
//!   calendar happens only at display and due-boundary computation.

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod input;
pub mod model;
pub mod schedule;
pub mod store;

pub use error::{CoreError, ErrorCode};
pub use store::{ReviewStore, StoreError};
