//! SQLite backend for Dayflow.
//!
//! Provides the durable local cache for record-store snapshots, the
//! relational task tracker tables, and the `.sql` migration runner. Wraps
//! [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod migrate;

pub use error::{Error, Result};
pub use migrate::{MigrationReport, run_migrations};
pub use store::SqliteStore;
