//! Core types and engine for Dayflow, a small HR records service.
//!
//! The [`Dayflow`] engine owns an explicitly constructed [`RecordStore`]
//! (employees, attendance, leave), mutates it synchronously under a single
//! commit path, persists the full snapshot to a [`SnapshotCache`], and hands
//! each committed change to a best-effort [`SyncMirror`].
//!
//! This crate is free of HTTP and database dependencies.

// Native `async fn` in traits; the traits spell out their `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod actor;
pub mod attendance;
pub mod clock;
mod directory;
pub mod employee;
pub mod engine;
pub mod error;
pub mod leave;
mod ledger;
pub mod mirror;
pub mod records;
pub mod snapshot;
pub mod store;
pub mod task;
pub mod workflow;

pub use actor::Actor;
pub use engine::Dayflow;
pub use error::{Error, Result};
pub use mirror::{Mirror, MirrorOp, MirrorOutcome, SyncMirror};
pub use records::RecordStore;
pub use snapshot::Snapshot;
pub use store::{SnapshotCache, TaskStore};

#[cfg(test)]
mod tests;
