//! [`SqliteStore`]: the SQLite implementation of [`SnapshotCache`] and
//! [`TaskStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use dayflow_core::{
  snapshot::Snapshot,
  store::{SnapshotCache, TaskQuery, TaskStore},
  task::{NewTask, Task, TaskComment, TaskPatch},
};

use crate::{
  Error, Result,
  encode::{
    RawComment, RawTask, TASK_COLUMNS, encode_date, encode_dt, encode_status,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Dayflow store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  #[cfg(test)]
  pub(crate) fn conn_for_test(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

}

// ─── SnapshotCache impl ──────────────────────────────────────────────────────

impl SnapshotCache for SqliteStore {
  type Error = Error;

  async fn load(&self, key: &str) -> Result<Option<Snapshot>> {
    let key = key.to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value_json FROM snapshots WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.as_deref().map(serde_json::from_str).transpose()?)
  }

  async fn save(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
    let key      = key.to_owned();
    let json     = serde_json::to_string(snapshot)?;
    let saved_at = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO snapshots (key, value_json, saved_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE
             SET value_json = excluded.value_json,
                 saved_at   = excluded.saved_at",
          rusqlite::params![key, json, saved_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── TaskStore impl ──────────────────────────────────────────────────────────

impl TaskStore for SqliteStore {
  type Error = Error;

  async fn create_task(&self, input: NewTask) -> Result<Task> {
    let now = Utc::now();
    let task = Task {
      id:          Uuid::new_v4(),
      title:       input.title,
      description: input.description,
      assignee_id: input.assignee_id,
      created_by:  input.created_by,
      status:      input.status,
      due_date:    input.due_date,
      created_at:  now,
      updated_at:  now,
    };

    let id_str       = encode_uuid(task.id);
    let title        = task.title.clone();
    let description  = task.description.clone();
    let assignee_id  = task.assignee_id.clone();
    let created_by   = task.created_by.clone();
    let status_str   = encode_status(task.status);
    let due_date_str = task.due_date.map(encode_date);
    let at_str       = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tasks (
             task_id, title, description, assignee_id, created_by,
             status, due_date, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![
            id_str,
            title,
            description,
            assignee_id,
            created_by,
            status_str,
            due_date_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(task_id = %task.id, assignee = %task.assignee_id, "task created");
    Ok(task)
  }

  async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTask> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = ?1"),
              rusqlite::params![id_str],
              RawTask::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTask::into_task).transpose()
  }

  async fn list_tasks(&self, query: TaskQuery) -> Result<Vec<Task>> {
    let limit_val  = query.limit.map_or(100, saturating_i64);
    let offset_val = query.offset.map_or(0, saturating_i64);
    let assignee   = query.assignee_id;

    let raws: Vec<RawTask> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TASK_COLUMNS}
             FROM tasks
            WHERE (?1 IS NULL OR assignee_id = ?1)
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![assignee, limit_val, offset_val],
            RawTask::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTask::into_task).collect()
  }

  async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Option<Task>> {
    let id_str = encode_uuid(id);
    let now    = Utc::now();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let raw = tx
          .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = ?1"),
            rusqlite::params![id_str],
            RawTask::from_row,
          )
          .optional()?;
        let Some(raw) = raw else {
          return Ok(None);
        };

        let mut task = raw.into_task().map_err(other)?;
        task.apply(patch, now);

        let changed = tx.execute(
          "UPDATE tasks
              SET title = ?2, description = ?3, assignee_id = ?4,
                  status = ?5, due_date = ?6, updated_at = ?7
            WHERE task_id = ?1",
          rusqlite::params![
            id_str,
            task.title,
            task.description,
            task.assignee_id,
            encode_status(task.status),
            task.due_date.map(encode_date),
            encode_dt(task.updated_at),
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        tx.commit()?;
        Ok(Some(task))
      })
      .await
      .map_err(unwrap_other)
  }

  async fn delete_task(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM task_comments WHERE task_id = ?1",
          rusqlite::params![id_str],
        )?;
        let n = tx.execute(
          "DELETE FROM tasks WHERE task_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }

  async fn list_comments(&self, task_id: Uuid) -> Result<Vec<TaskComment>> {
    let id_str = encode_uuid(task_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT comment_id, task_id, author_id, body, created_at
             FROM task_comments
            WHERE task_id = ?1
            ORDER BY created_at ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawComment {
              comment_id: row.get(0)?,
              task_id:    row.get(1)?,
              author_id:  row.get(2)?,
              body:       row.get(3)?,
              created_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn add_comment(
    &self,
    task_id:   Uuid,
    author_id: String,
    body:      String,
  ) -> Result<Option<TaskComment>> {
    let comment = TaskComment {
      id: Uuid::new_v4(),
      task_id,
      author_id,
      body,
      created_at: Utc::now(),
    };

    let comment_id_str = encode_uuid(comment.id);
    let task_id_str    = encode_uuid(task_id);
    let author_id      = comment.author_id.clone();
    let body           = comment.body.clone();
    let at_str         = encode_dt(comment.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM tasks WHERE task_id = ?1",
            rusqlite::params![task_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO task_comments (comment_id, task_id, author_id, body, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![comment_id_str, task_id_str, author_id, body, at_str],
        )?;
        Ok(true)
      })
      .await?;

    Ok(inserted.then_some(comment))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// SQLite treats a negative `LIMIT` as unbounded, so never wrap.
fn saturating_i64(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

/// Carry a decode failure out of a `conn.call` closure.
fn other(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

/// Recover an [`Error`] smuggled out with [`other`].
fn unwrap_other(e: tokio_rusqlite::Error) -> Error {
  match e {
    tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
      Ok(e) => *e,
      Err(inner) => Error::Database(tokio_rusqlite::Error::Other(inner)),
    },
    e => Error::Database(e),
  }
}
