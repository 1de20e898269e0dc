//! Configuration and startup helpers shared by the Dayflow binaries.

pub mod settings;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber. `RUST_LOG` overrides the default
/// `INFO` level.
pub fn init_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();
}
