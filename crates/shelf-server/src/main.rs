//! The `shelf` server binary: one SQLite file, one HTTP listener.
//!
//! Configuration comes from `config.toml` (override the path with
//! `--config`) layered under `SHELF_*` environment variables.

mod config;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use shelf_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Shelf library-catalog server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

fn init_tracing() {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  init_tracing();

  let cli = Cli::parse();
  let settings = ServerConfig::load(&cli.config)?;

  let db_path = expand_tilde(&settings.db_path);
  tracing::info!(path = %db_path.display(), "opening catalog database");
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  let app = shelf_api::api_router(Arc::new(store))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", settings.host, settings.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  match path.to_string_lossy().strip_prefix("~/") {
    Some(rest) => match std::env::var("HOME") {
      Ok(home) => PathBuf::from(home).join(rest),
      Err(_) => path.to_path_buf(),
    },
    None => path.to_path_buf(),
  }
}
