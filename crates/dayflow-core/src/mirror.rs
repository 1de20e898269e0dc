//! Best-effort, one-way replication of committed local mutations to a remote
//! document store.
//!
//! The local record store is authoritative. Every mutation is handed to
//! [`SyncMirror::dispatch`] only after it has been committed locally; the
//! remote write runs on the tokio runtime and the caller never waits for it.
//! There is no retry and no queue: a failed write is logged, counted, and
//! forgotten, and the two stores differ until the same record is written
//! again.

use std::{
  future::Future,
  sync::{
    Arc,
    Mutex,
    PoisonError,
    atomic::{AtomicU64, Ordering},
  },
};

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::{
  attendance::AttendanceRecord,
  employee::{Employee, LeaveBalance},
  leave::LeaveRequest,
};

// ─── Operations ──────────────────────────────────────────────────────────────

/// A single replicated write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MirrorOp {
  UpsertEmployee(Employee),
  UpdateBalance {
    employee_id: String,
    balance:     LeaveBalance,
  },
  UpsertAttendance(AttendanceRecord),
  UpsertLeave(LeaveRequest),
  DeleteLeave {
    id: String,
  },
}

impl MirrorOp {
  /// The remote collection the document lives in.
  pub fn collection(&self) -> &'static str {
    match self {
      Self::UpsertEmployee(_) | Self::UpdateBalance { .. } => "employees",
      Self::UpsertAttendance(_) => "attendance",
      Self::UpsertLeave(_) | Self::DeleteLeave { .. } => "leaves",
    }
  }

  /// The id of the document within [`Self::collection`].
  pub fn document_id(&self) -> &str {
    match self {
      Self::UpsertEmployee(e) => &e.id,
      Self::UpdateBalance { employee_id, .. } => employee_id,
      Self::UpsertAttendance(r) => &r.id,
      Self::UpsertLeave(l) => &l.id,
      Self::DeleteLeave { id } => id,
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::UpsertEmployee(_) => "upsert_employee",
      Self::UpdateBalance { .. } => "update_balance",
      Self::UpsertAttendance(_) => "upsert_attendance",
      Self::UpsertLeave(_) => "upsert_leave",
      Self::DeleteLeave { .. } => "delete_leave",
    }
  }
}

// ─── Remote trait ────────────────────────────────────────────────────────────

/// A remote document store that can receive [`MirrorOp`]s.
pub trait Mirror: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Check that the remote is reachable. Called once, at startup.
  fn probe(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply one write to the remote.
  fn apply<'a>(
    &'a self,
    op: &'a MirrorOp,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Stand-in remote for deployments without one. Mirrors built around it are
/// always disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemote;

#[derive(Debug, thiserror::Error)]
#[error("no remote configured")]
pub struct NoRemoteError;

impl Mirror for NoRemote {
  type Error = NoRemoteError;

  async fn probe(&self) -> Result<(), NoRemoteError> { Err(NoRemoteError) }

  async fn apply(&self, _: &MirrorOp) -> Result<(), NoRemoteError> {
    Err(NoRemoteError)
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// What became of one dispatched write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum MirrorOutcome {
  Committed,
  SkippedDisabled,
  Failed(String),
}

#[derive(Debug, Default)]
struct MirrorStats {
  committed: AtomicU64,
  skipped:   AtomicU64,
  failed:    AtomicU64,
}

impl MirrorStats {
  fn record(&self, outcome: &MirrorOutcome) {
    let counter = match outcome {
      MirrorOutcome::Committed => &self.committed,
      MirrorOutcome::SkippedDisabled => &self.skipped,
      MirrorOutcome::Failed(_) => &self.failed,
    };
    counter.fetch_add(1, Ordering::Relaxed);
  }
}

/// Point-in-time copy of the mirror counters. A non-zero `failed` means the
/// remote has drifted from local state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorCounts {
  pub enabled:   bool,
  pub committed: u64,
  pub skipped:   u64,
  pub failed:    u64,
}

// ─── SyncMirror ──────────────────────────────────────────────────────────────

pub struct SyncMirror<M> {
  remote:    Option<Arc<M>>,
  stats:     Arc<MirrorStats>,
  in_flight: Mutex<JoinSet<MirrorOutcome>>,
}

impl<M: Mirror> SyncMirror<M> {
  /// A mirror that forwards every write to `remote`.
  pub fn enabled(remote: M) -> Self { Self::build(Some(Arc::new(remote))) }

  /// A mirror that drops every write.
  pub fn disabled() -> Self { Self::build(None) }

  /// Probe `remote` once and enable mirroring only if it answers. A missing
  /// or unreachable remote yields a disabled mirror; this never fails.
  pub async fn connect(remote: Option<M>) -> Self {
    let Some(remote) = remote else {
      tracing::info!("remote mirror not configured; mirroring disabled");
      return Self::disabled();
    };
    match remote.probe().await {
      Ok(()) => {
        tracing::info!("remote mirror reachable; mirroring enabled");
        Self::enabled(remote)
      }
      Err(e) => {
        tracing::warn!(error = %e, "remote mirror unreachable; mirroring disabled");
        Self::disabled()
      }
    }
  }

  fn build(remote: Option<Arc<M>>) -> Self {
    Self {
      remote,
      stats: Arc::default(),
      in_flight: Mutex::default(),
    }
  }

  pub fn is_enabled(&self) -> bool { self.remote.is_some() }

  pub fn counts(&self) -> MirrorCounts {
    MirrorCounts {
      enabled:   self.is_enabled(),
      committed: self.stats.committed.load(Ordering::Relaxed),
      skipped:   self.stats.skipped.load(Ordering::Relaxed),
      failed:    self.stats.failed.load(Ordering::Relaxed),
    }
  }

  /// Hand a committed mutation to the remote without waiting for it.
  ///
  /// Must be called from within a tokio runtime.
  pub fn dispatch(&self, op: MirrorOp) {
    let remote = self.remote.clone();
    let stats = Arc::clone(&self.stats);

    let mut in_flight =
      self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
    // Reap finished writes so the set only holds live ones.
    while in_flight.try_join_next().is_some() {}

    in_flight.spawn(async move {
      let outcome = match remote {
        None => MirrorOutcome::SkippedDisabled,
        Some(remote) => match remote.apply(&op).await {
          Ok(()) => {
            tracing::debug!(
              op = op.name(),
              collection = op.collection(),
              id = op.document_id(),
              "mirrored"
            );
            MirrorOutcome::Committed
          }
          Err(e) => {
            tracing::warn!(
              op = op.name(),
              collection = op.collection(),
              id = op.document_id(),
              error = %e,
              "mirror write failed; remote copy is stale"
            );
            MirrorOutcome::Failed(e.to_string())
          }
        },
      };
      stats.record(&outcome);
      outcome
    });
  }

  /// Wait for every write dispatched so far and return their outcomes in
  /// completion order.
  pub async fn drain(&self) -> Vec<MirrorOutcome> {
    let mut pending = std::mem::take(
      &mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner),
    );
    let mut outcomes = Vec::with_capacity(pending.len());
    while let Some(joined) = pending.join_next().await {
      match joined {
        Ok(outcome) => outcomes.push(outcome),
        Err(e) => {
          tracing::warn!(error = %e, "mirror task did not complete");
          outcomes.push(MirrorOutcome::Failed(e.to_string()));
        }
      }
    }
    outcomes
  }
}
