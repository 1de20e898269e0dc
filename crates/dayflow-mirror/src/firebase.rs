//! Firebase Realtime Database backend.
//!
//! Documents live at `{base_url}/{collection}/{id}.json`. Upserts are `PUT`s
//! of the whole record, balance updates `PATCH` the `leave_balance` field of
//! the employee document, and cancellations `DELETE` the leave document.

use std::time::Duration;

use dayflow_core::mirror::{Mirror, MirrorOp};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{Error, Result};

fn default_timeout_secs() -> u64 { 10 }

/// Connection settings for a Firebase Realtime Database.
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseConfig {
  /// e.g. `https://dayflow-hr.firebaseio.com`
  pub base_url:     String,
  /// Database secret or ID token, sent as the `auth` query parameter.
  #[serde(default)]
  pub auth_token:   Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct FirebaseMirror {
  client: Client,
  config: FirebaseConfig,
}

impl FirebaseMirror {
  pub fn new(config: FirebaseConfig) -> Result<Self> {
    if config.base_url.trim().is_empty() {
      return Err(Error::Config("base_url is empty".into()));
    }
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
  }

  async fn send(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
  ) -> Result<()> {
    let mut req = self.client.request(method.clone(), self.url(path));
    if let Some(token) = &self.config.auth_token {
      req = req.query(&[("auth", token)]);
    }
    if let Some(body) = &body {
      req = req.json(body);
    }

    let resp = req.send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status {
        method,
        path: path.to_owned(),
        status: resp.status(),
      });
    }
    Ok(())
  }
}

/// The request that replicates `op`: method, path below the base URL, and
/// JSON body.
fn request_for(op: &MirrorOp) -> Result<(Method, String, Option<Value>)> {
  let path = format!("{}/{}.json", op.collection(), op.document_id());
  let request = match op {
    MirrorOp::UpsertEmployee(employee) => {
      (Method::PUT, path, Some(serde_json::to_value(employee)?))
    }
    MirrorOp::UpsertAttendance(record) => {
      (Method::PUT, path, Some(serde_json::to_value(record)?))
    }
    MirrorOp::UpsertLeave(leave) => {
      (Method::PUT, path, Some(serde_json::to_value(leave)?))
    }
    MirrorOp::UpdateBalance { balance, .. } => {
      (Method::PATCH, path, Some(json!({ "leave_balance": balance })))
    }
    MirrorOp::DeleteLeave { .. } => (Method::DELETE, path, None),
  };
  Ok(request)
}

impl Mirror for FirebaseMirror {
  type Error = Error;

  /// A shallow read of the database root.
  async fn probe(&self) -> Result<()> {
    let mut req = self
      .client
      .get(self.url(".json"))
      .query(&[("shallow", "true")]);
    if let Some(token) = &self.config.auth_token {
      req = req.query(&[("auth", token)]);
    }
    let resp = req.send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status {
        method: Method::GET,
        path:   ".json".into(),
        status: resp.status(),
      });
    }
    tracing::debug!(base_url = %self.config.base_url, "firebase probe ok");
    Ok(())
  }

  async fn apply(&self, op: &MirrorOp) -> Result<()> {
    let (method, path, body) = request_for(op)?;
    self.send(method, &path, body).await
  }
}
