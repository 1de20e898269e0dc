//! Storage traits and supporting query types.
//!
//! [`SnapshotCache`] is the durable local cache behind the record store;
//! [`TaskStore`] is the relational backend of the task tracker. Both are
//! implemented by `dayflow-store-sqlite`; higher layers depend only on these
//! abstractions.

use std::{
  collections::HashMap,
  future::Future,
  sync::{Mutex, PoisonError},
};

use uuid::Uuid;

use crate::{
  snapshot::Snapshot,
  task::{NewTask, Task, TaskComment, TaskPatch},
};

// ─── Snapshot cache ──────────────────────────────────────────────────────────

/// Durable storage for whole [`Snapshot`]s, addressed by a single key.
///
/// All methods return `Send` futures so implementations can be shared across
/// a multi-threaded tokio runtime.
pub trait SnapshotCache: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the snapshot stored under `key`, or `None` if nothing was ever
  /// written.
  fn load<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Snapshot>, Self::Error>> + Send + 'a;

  /// Replace the snapshot stored under `key`.
  fn save<'a>(
    &'a self,
    key: &'a str,
    snapshot: &'a Snapshot,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// A process-local cache holding serialised snapshots in a map. Nothing
/// survives the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
  pub fn new() -> Self { Self::default() }

  /// The raw JSON stored under `key`, if any.
  pub fn raw(&self, key: &str) -> Option<String> {
    self
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .cloned()
  }
}

impl SnapshotCache for MemoryCache {
  type Error = crate::Error;

  async fn load(&self, key: &str) -> crate::Result<Option<Snapshot>> {
    self.raw(key).as_deref().map(Snapshot::from_json).transpose()
  }

  async fn save(&self, key: &str, snapshot: &Snapshot) -> crate::Result<()> {
    let json = snapshot.to_json()?;
    self
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.to_owned(), json);
    Ok(())
  }
}

// ─── Task store ──────────────────────────────────────────────────────────────

/// Parameters for [`TaskStore::list_tasks`].
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
  /// Restrict to tasks assigned to this employee.
  pub assignee_id: Option<String>,
  pub limit:       Option<usize>,
  pub offset:      Option<usize>,
}

/// Abstraction over the task tracker backend. Authorization is the caller's
/// concern; see [`crate::actor::Actor`].
pub trait TaskStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn create_task(
    &self,
    input: NewTask,
  ) -> impl Future<Output = Result<Task, Self::Error>> + Send + '_;

  /// Returns `None` if not found.
  fn get_task(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Task>, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_tasks(
    &self,
    query: TaskQuery,
  ) -> impl Future<Output = Result<Vec<Task>, Self::Error>> + Send + '_;

  /// Apply `patch` and return the updated task, or `None` if not found.
  fn update_task(
    &self,
    id: Uuid,
    patch: TaskPatch,
  ) -> impl Future<Output = Result<Option<Task>, Self::Error>> + Send + '_;

  /// Delete a task and its comments. Returns `false` if not found.
  fn delete_task(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Oldest first.
  fn list_comments(
    &self,
    task_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TaskComment>, Self::Error>> + Send + '_;

  /// Returns `None` if the task does not exist.
  fn add_comment(
    &self,
    task_id: Uuid,
    author_id: String,
    body: String,
  ) -> impl Future<Output = Result<Option<TaskComment>, Self::Error>> + Send + '_;
}
