//! Task tracker types.
//!
//! Clients speak one set of status names and the relational backend another;
//! the two are translated through an explicit table in both directions.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::Actor;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Status names as exchanged with API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
  #[default]
  Pending,
  InProgress,
  Completed,
}

/// Status names as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackendTaskStatus {
  Todo,
  InProgress,
  Done,
}

const STATUS_TABLE: [(TaskStatus, BackendTaskStatus); 3] = [
  (TaskStatus::Pending, BackendTaskStatus::Todo),
  (TaskStatus::InProgress, BackendTaskStatus::InProgress),
  (TaskStatus::Completed, BackendTaskStatus::Done),
];

impl TaskStatus {
  pub fn to_backend(self) -> BackendTaskStatus {
    STATUS_TABLE
      .iter()
      .find(|(client, _)| *client == self)
      .map(|(_, backend)| *backend)
      .unwrap_or(BackendTaskStatus::Todo)
  }

  pub fn from_backend(status: BackendTaskStatus) -> Self {
    STATUS_TABLE
      .iter()
      .find(|(_, backend)| *backend == status)
      .map(|(client, _)| *client)
      .unwrap_or_default()
  }
}

impl BackendTaskStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Todo => "TODO",
      Self::InProgress => "IN_PROGRESS",
      Self::Done => "DONE",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "TODO" => Some(Self::Todo),
      "IN_PROGRESS" => Some(Self::InProgress),
      "DONE" => Some(Self::Done),
      _ => None,
    }
  }
}

impl fmt::Display for BackendTaskStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Task ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  pub id:          Uuid,
  pub title:       String,
  pub description: String,
  pub assignee_id: String,
  pub created_by:  String,
  pub status:      TaskStatus,
  pub due_date:    Option<NaiveDate>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskComment {
  pub id:         Uuid,
  pub task_id:    Uuid,
  pub author_id:  String,
  pub body:       String,
  pub created_at: DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::TaskStore::create_task`]. Timestamps and the id
/// are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTask {
  pub title:       String,
  pub description: String,
  pub assignee_id: String,
  pub created_by:  String,
  pub status:      TaskStatus,
  pub due_date:    Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub assignee_id: Option<String>,
  pub status:      Option<TaskStatus>,
  /// `Some(None)` clears the due date.
  pub due_date:    Option<Option<NaiveDate>>,
}

impl Task {
  /// Admins see every task; employees see the tasks assigned to them.
  pub fn visible_to(&self, actor: &Actor) -> bool {
    actor.can_act_for(&self.assignee_id)
  }

  /// Apply `patch` in place and bump `updated_at`.
  pub fn apply(&mut self, patch: TaskPatch, at: DateTime<Utc>) {
    if let Some(title) = patch.title {
      self.title = title;
    }
    if let Some(description) = patch.description {
      self.description = description;
    }
    if let Some(assignee_id) = patch.assignee_id {
      self.assignee_id = assignee_id;
    }
    if let Some(status) = patch.status {
      self.status = status;
    }
    if let Some(due_date) = patch.due_date {
      self.due_date = due_date;
    }
    self.updated_at = at;
  }
}
