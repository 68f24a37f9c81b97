//! Server configuration, deserialised from `config.toml` and `SHELF_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:    String,
  #[serde(default = "default_port")]
  pub port:    u16,
  /// Path of the SQLite database file.
  #[serde(default = "default_db_path")]
  pub db_path: PathBuf,
}

impl ServerConfig {
  /// Read the TOML file at `path` (optional) layered under `SHELF_*`
  /// environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = ::config::Config::builder()
      .add_source(::config::File::from(path.to_path_buf()).required(false))
      .add_source(::config::Environment::with_prefix("SHELF"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8000 }

fn default_db_path() -> PathBuf { PathBuf::from("shelf.db") }
