//! dayflow-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! cache, loads the record snapshot, probes the remote mirror and serves the
//! JSON API under `/api`.
//!
//! # Token digest generation
//!
//! To generate the `token_sha256` value for a `[[users]]` entry:
//!
//! ```text
//! echo -n 'my-token' | cargo run -p dayflow-server --bin dayflow-server -- --hash-token
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use dayflow_api::{AppState, api_router, hash_token};
use dayflow_core::{Dayflow, RecordStore, SyncMirror, clock::SystemClock};
use dayflow_mirror::FirebaseMirror;
use dayflow_server::settings::{ServerConfig, expand_tilde, load_seed};
use dayflow_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Parser)]
#[command(author, version, about = "Dayflow HR server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the SHA-256 digest of a token read from stdin and exit.
  #[arg(long)]
  hash_token: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dayflow_server::init_tracing();

  let cli = Cli::parse();

  // Helper mode: hash a token and exit.
  if cli.hash_token {
    let token = read_stdin_line()?;
    println!("{}", hash_token(&token));
    return Ok(());
  }

  let server_cfg = ServerConfig::load(&cli.config)?;
  let database_path = expand_tilde(&server_cfg.database_path);

  // Open SQLite cache and task store.
  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open store at {database_path:?}"))?;

  // Load records, seeding an empty cache if configured.
  let records = match &server_cfg.seed_path {
    Some(seed_path) => {
      let seed = load_seed(&expand_tilde(seed_path)).await?;
      RecordStore::open_or_seed(store.clone(), &server_cfg.snapshot_key, seed)
        .await
    }
    None => RecordStore::open(store.clone(), &server_cfg.snapshot_key).await,
  }
  .context("failed to load record snapshot")?;

  // Probe the remote once; any failure leaves mirroring disabled.
  let remote = match server_cfg.mirror.clone().map(FirebaseMirror::new) {
    Some(Ok(mirror)) => Some(mirror),
    Some(Err(e)) => {
      tracing::warn!(error = %e, "invalid mirror configuration");
      None
    }
    None => None,
  };
  let mirror = SyncMirror::connect(remote).await;

  let engine = Arc::new(Dayflow::new(records, mirror, Arc::new(SystemClock)));

  let tokens = server_cfg.token_registry();
  if tokens.is_empty() {
    tracing::warn!("no users configured; every authenticated route will return 401");
  }

  let state = AppState {
    engine: Arc::clone(&engine),
    tasks:  Arc::new(store),
    tokens: Arc::new(tokens),
  };

  let app = Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  let outcomes = engine
    .shutdown()
    .await
    .context("failed to flush records on shutdown")?;
  let counts = engine.mirror_counts();
  tracing::info!(
    drained = outcomes.len(),
    committed = counts.committed,
    failed = counts.failed,
    "shut down"
  );

  Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "cannot listen for Ctrl+C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "cannot listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
    _ = terminate => tracing::info!("received SIGTERM, shutting down"),
  }
}

/// Read one line from stdin, without the trailing newline.
fn read_stdin_line() -> anyhow::Result<String> {
  use std::io::{self, BufRead};
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
