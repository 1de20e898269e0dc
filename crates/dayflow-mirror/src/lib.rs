//! Remote mirror backends for Dayflow.
//!
//! [`FirebaseMirror`] replicates committed records to a Firebase Realtime
//! Database over its REST interface. It implements
//! [`dayflow_core::Mirror`] and is driven by
//! [`dayflow_core::SyncMirror`], which owns the fire-and-forget semantics.

mod firebase;

pub mod error;

pub use error::{Error, Result};
pub use firebase::{FirebaseConfig, FirebaseMirror};
