//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! | Error | Status | Body |
//! |-------|--------|------|
//! | missing or unknown token | 401 | `{"error"}` |
//! | body schema failure | 422 | `{"error", "fields"}` |
//! | engine validation | 422 | `{"error"}` |
//! | not found | 404 | `{"error"}` |
//! | forbidden | 403 | `{"error"}` |
//! | store or cache failure | 500 | `{"error"}` |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("missing or invalid bearer token")]
  Unauthorized,

  #[error("invalid request body")]
  Validation(#[from] ValidationErrors),

  #[error(transparent)]
  Json(#[from] JsonRejection),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] dayflow_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Json(rejection) => rejection.status(),
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(e) if e.is_not_found() => StatusCode::NOT_FOUND,
      ApiError::Core(e) if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Core(dayflow_core::Error::Forbidden(_)) => StatusCode::FORBIDDEN,
      ApiError::Core(_) | ApiError::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

/// Field name to the validator codes that failed on it.
fn field_codes(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
  errors
    .field_errors()
    .into_iter()
    .map(|(field, errs)| {
      let codes = errs.iter().map(|e| e.code.to_string()).collect();
      (field.to_string(), codes)
    })
    .collect()
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    match &self {
      ApiError::Unauthorized => {
        let mut res =
          (status, Json(json!({ "error": self.to_string() }))).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Bearer realm=\"dayflow\""),
        );
        res
      }
      ApiError::Validation(errors) => (
        status,
        Json(json!({
          "error":  self.to_string(),
          "fields": field_codes(errors),
        })),
      )
        .into_response(),
      ApiError::Json(rejection) => {
        (status, Json(json!({ "error": rejection.body_text() }))).into_response()
      }
      _ => (status, Json(json!({ "error": self.to_string() }))).into_response(),
    }
  }
}

#[cfg(test)]
mod tests {
  use dayflow_core::{Error, leave::LeaveType};

  use super::*;

  #[test]
  fn core_errors_map_to_statuses() {
    let cases = [
      (Error::EmployeeNotFound("E9".into()), StatusCode::NOT_FOUND),
      (Error::LeaveNotFound("L9".into()), StatusCode::NOT_FOUND),
      (
        Error::InsufficientBalance(LeaveType::Sick),
        StatusCode::UNPROCESSABLE_ENTITY,
      ),
      (Error::ReasonTooShort { min: 5 }, StatusCode::UNPROCESSABLE_ENTITY),
      (Error::Forbidden("no"), StatusCode::FORBIDDEN),
      (
        Error::Cache("disk full".into()),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
    ];
    for (err, expected) in cases {
      assert_eq!(ApiError::from(err).status(), expected);
    }
  }

  #[test]
  fn unauthorized_carries_challenge() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
