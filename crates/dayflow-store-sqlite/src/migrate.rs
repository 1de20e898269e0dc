//! Applies numbered `.sql` files to a database, in lexical filename order.
//!
//! Each file runs inside its own transaction together with a row in
//! `schema_migrations`, so a file is either fully applied and recorded or
//! not applied at all. Files already recorded are skipped. The first failing
//! file stops the run.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{Error, Result, encode::encode_dt};

const BOOKKEEPING: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    name        TEXT PRIMARY KEY,
    applied_at  TEXT NOT NULL
);
";

/// What a call to [`run_migrations`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
  /// Files applied by this run, in order.
  pub applied: Vec<String>,
  /// Files skipped because they were already recorded.
  pub skipped: Vec<String>,
}

/// Run every `*.sql` file in `dir` against the database at `db_path`.
pub async fn run_migrations(
  db_path: impl AsRef<Path>,
  dir: impl AsRef<Path>,
) -> Result<MigrationReport> {
  let dir = dir.as_ref();
  let files = sql_files(dir).await?;
  tracing::info!(dir = %dir.display(), count = files.len(), "found migration files");

  let conn = tokio_rusqlite::Connection::open(db_path.as_ref()).await?;
  conn
    .call(|conn| {
      conn.execute_batch(BOOKKEEPING)?;
      Ok(())
    })
    .await?;

  let mut report = MigrationReport::default();

  for path in files {
    let name = file_name(&path);
    let sql = tokio::fs::read_to_string(&path)
      .await
      .map_err(|source| Error::Io { path: path.clone(), source })?;

    let applied_at = encode_dt(Utc::now());
    let name_in = name.clone();
    let applied = conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let seen = tx
          .query_row(
            "SELECT 1 FROM schema_migrations WHERE name = ?1",
            rusqlite::params![name_in],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if seen {
          return Ok(false);
        }
        tx.execute_batch(&sql)?;
        tx.execute(
          "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, ?2)",
          rusqlite::params![name_in, applied_at],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await
      .map_err(|source| {
        tracing::error!(file = %name, error = %source, "migration failed");
        Error::Migration { file: name.clone(), source }
      })?;

    if applied {
      tracing::info!(file = %name, "applied migration");
      report.applied.push(name);
    } else {
      tracing::debug!(file = %name, "migration already applied");
      report.skipped.push(name);
    }
  }

  Ok(report)
}

async fn sql_files(dir: &Path) -> Result<Vec<PathBuf>> {
  let io_err = |source| Error::Io { path: dir.to_path_buf(), source };

  let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
  let mut files = Vec::new();
  while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
    let path = entry.path();
    if path.extension().is_some_and(|ext| ext == "sql") {
      files.push(path);
    }
  }
  files.sort_by_key(|p| file_name(p));
  Ok(files)
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default()
}
