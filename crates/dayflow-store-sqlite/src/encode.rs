//! Encoding and decoding helpers between Dayflow domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that lexical order matches time order. Dates
//! are `YYYY-MM-DD`. UUIDs are hyphenated lowercase. Task statuses use the
//! backend names (`TODO`, `IN_PROGRESS`, `DONE`).

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use dayflow_core::task::{BackendTaskStatus, Task, TaskComment, TaskStatus};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Task status ─────────────────────────────────────────────────────────────

pub fn encode_status(status: TaskStatus) -> &'static str {
  status.to_backend().as_str()
}

pub fn decode_status(s: &str) -> Result<TaskStatus> {
  BackendTaskStatus::parse(s)
    .map(TaskStatus::from_backend)
    .ok_or_else(|| Error::UnknownStatus(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const TASK_COLUMNS: &str = "task_id, title, description, assignee_id, \
                                created_by, status, due_date, created_at, \
                                updated_at";

/// Raw strings read directly from a `tasks` row.
pub struct RawTask {
  pub task_id:     String,
  pub title:       String,
  pub description: String,
  pub assignee_id: String,
  pub created_by:  String,
  pub status:      String,
  pub due_date:    Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawTask {
  /// Map a row selected with [`TASK_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      task_id:     row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      assignee_id: row.get(3)?,
      created_by:  row.get(4)?,
      status:      row.get(5)?,
      due_date:    row.get(6)?,
      created_at:  row.get(7)?,
      updated_at:  row.get(8)?,
    })
  }

  pub fn into_task(self) -> Result<Task> {
    Ok(Task {
      id:          decode_uuid(&self.task_id)?,
      title:       self.title,
      description: self.description,
      assignee_id: self.assignee_id,
      created_by:  self.created_by,
      status:      decode_status(&self.status)?,
      due_date:    self.due_date.as_deref().map(decode_date).transpose()?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `task_comments` row.
pub struct RawComment {
  pub comment_id: String,
  pub task_id:    String,
  pub author_id:  String,
  pub body:       String,
  pub created_at: String,
}

impl RawComment {
  pub fn into_comment(self) -> Result<TaskComment> {
    Ok(TaskComment {
      id:         decode_uuid(&self.comment_id)?,
      task_id:    decode_uuid(&self.task_id)?,
      author_id:  self.author_id,
      body:       self.body,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
