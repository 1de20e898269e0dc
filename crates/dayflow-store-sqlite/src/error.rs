//! Error type for `dayflow-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown task status: {0:?}")]
  UnknownStatus(String),

  #[error("cannot read {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A migration file failed; files after it were not run.
  #[error("migration {file} failed: {source}")]
  Migration {
    file:   String,
    #[source]
    source: tokio_rusqlite::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
