//! Error types for `shelf-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("book not found: {0}")]
  BookNotFound(Uuid),

  #[error("author not found: {0}")]
  AuthorNotFound(Uuid),

  #[error("genre not found: {0}")]
  GenreNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  /// The read-before-rate gate: rating requires an existing `read` status.
  #[error("user {user_id} has not marked book {book_id} as read")]
  NotMarkedRead { user_id: Uuid, book_id: Uuid },

  #[error("stars must be between 1 and 5, got {0}")]
  InvalidStars(u8),

  #[error("username already taken: {0:?}")]
  UsernameTaken(String),

  #[error("a book with isbn {0:?} already exists")]
  DuplicateIsbn(String),

  #[error("a genre named {0:?} already exists")]
  DuplicateGenre(String),

  #[error("unknown read status: {0:?}")]
  UnknownStatus(String),

  /// A backend fault that carries no domain meaning.
  #[error("storage error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
