//! dayflow-migrate binary.
//!
//! Applies every `*.sql` file in `--dir` to the database at `--database`, in
//! lexical filename order, skipping files already recorded as applied.
//! Exits non-zero on the first failing file.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use dayflow_server::settings::expand_tilde;
use dayflow_store_sqlite::run_migrations;

#[derive(Parser)]
#[command(author, version, about = "Apply Dayflow SQL migrations")]
struct Cli {
  /// SQLite database file; created if missing.
  #[arg(long)]
  database: PathBuf,

  /// Directory holding the `.sql` files.
  #[arg(long, default_value = "migrations")]
  dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dayflow_server::init_tracing();

  let cli = Cli::parse();
  let database = expand_tilde(&cli.database);

  let report = run_migrations(&database, &cli.dir)
    .await
    .with_context(|| format!("migrating {database:?} from {:?}", cli.dir))?;

  tracing::info!(
    applied = report.applied.len(),
    skipped = report.skipped.len(),
    "migrations complete"
  );
  Ok(())
}
