//! Runtime server configuration, layered from a TOML file and `DAYFLOW_`
//! environment variables.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `DAYFLOW_MIRROR__BASE_URL`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use dayflow_api::TokenRegistry;
use dayflow_core::{Actor, Snapshot, employee::Role};
use dayflow_mirror::FirebaseConfig;
use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8080 }

fn default_database_path() -> PathBuf { PathBuf::from("dayflow.db") }

fn default_snapshot_key() -> String { "dayflow".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,
  /// Key the record snapshot is stored under.
  #[serde(default = "default_snapshot_key")]
  pub snapshot_key:  String,
  /// JSON snapshot loaded when the cache has nothing under `snapshot_key`.
  #[serde(default)]
  pub seed_path:     Option<PathBuf>,
  /// Remote mirror; mirroring is disabled when absent.
  #[serde(default)]
  pub mirror:        Option<FirebaseConfig>,
  #[serde(default)]
  pub users:         Vec<UserConfig>,
}

/// One API caller.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
  pub employee_id:  String,
  pub role:         Role,
  /// Hex SHA-256 of the bearer token; see `dayflow-server --hash-token`.
  pub token_sha256: String,
}

impl ServerConfig {
  /// Read `path` (optional) under `DAYFLOW_*` environment overrides.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("DAYFLOW")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn token_registry(&self) -> TokenRegistry {
    self
      .users
      .iter()
      .map(|u| {
        let actor = Actor { employee_id: u.employee_id.clone(), role: u.role };
        (u.token_sha256.clone(), actor)
      })
      .collect()
  }
}

/// Parse a seed snapshot file.
pub async fn load_seed(path: &Path) -> anyhow::Result<Snapshot> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read seed file {path:?}"))?;
  Snapshot::from_json(&raw)
    .with_context(|| format!("failed to parse seed file {path:?}"))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use dayflow_api::hash_token;

  use super::*;

  fn write_config(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
  }

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ServerConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.snapshot_key, "dayflow");
    assert!(cfg.mirror.is_none());
    assert!(cfg.users.is_empty());
  }

  #[test]
  fn full_file_parses() {
    let digest = hash_token("s3cret");
    let file = write_config(&format!(
      r#"
        host          = "0.0.0.0"
        port          = 9000
        database_path = "/var/lib/dayflow/dayflow.db"
        seed_path     = "seed.json"

        [mirror]
        base_url   = "https://dayflow.firebaseio.com"
        auth_token = "db-secret"

        [[users]]
        employee_id  = "A1"
        role         = "ADMIN"
        token_sha256 = "{digest}"
      "#
    ));

    let cfg = ServerConfig::load(file.path()).unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:9000");
    assert_eq!(cfg.seed_path.as_deref(), Some(Path::new("seed.json")));

    let mirror = cfg.mirror.as_ref().unwrap();
    assert_eq!(mirror.timeout_secs, 10);
    assert_eq!(mirror.auth_token.as_deref(), Some("db-secret"));

    let tokens = cfg.token_registry();
    assert_eq!(tokens.resolve("s3cret"), Some(&Actor::admin("A1")));
  }

  #[tokio::test]
  async fn seed_file_round_trips() {
    let file = write_config(r#"{ "employees": [], "leaves": [] }"#);
    let seed = load_seed(file.path()).await.unwrap();
    assert_eq!(seed, Snapshot::default());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/dayflow.db")),
      PathBuf::from(home).join("dayflow.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs.db")), PathBuf::from("/abs.db"));
  }
}
