//! Error type for `dayflow-mirror`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The remote answered, but not with a success status.
  #[error("{method} {path} returned {status}")]
  Status {
    method: reqwest::Method,
    path:   String,
    status: reqwest::StatusCode,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid mirror config: {0}")]
  Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
