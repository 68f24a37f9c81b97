//! Error type for `shelf-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] shelf_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// Whether this error is a storage-level uniqueness/constraint rejection —
  /// the signal that a racing duplicate write lost, which call sites
  /// translate into the corresponding domain error.
  pub(crate) fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _),
      )) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
  }
}

/// Flatten into the domain error: pass domain variants through and report
/// backend faults as `Storage`. The API layer relies on this to map errors
/// to HTTP statuses.
impl From<Error> for shelf_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(e) => e,
      other => shelf_core::Error::Storage(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
