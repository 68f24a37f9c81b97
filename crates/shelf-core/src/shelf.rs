//! Per-user shelf state — read statuses and ratings.
//!
//! Both records are owned by their (user, book) pair and unique for it. A
//! status row is created on the first shelving action and updated in place
//! afterwards; its `created_at` never changes. Ratings are upserted the same
//! way and are gated on an existing `read` status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Book;

// ─── Read status ─────────────────────────────────────────────────────────────

/// Where a book sits on a user's shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
  Read,
  Want,
  Reading,
}

impl ReadStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Read => "read",
      Self::Want => "want",
      Self::Reading => "reading",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "read" => Some(Self::Read),
      "want" => Some(Self::Want),
      "reading" => Some(Self::Reading),
      _ => None,
    }
  }
}

/// One user's status for one book. Unique per (user, book).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBookStatus {
  pub status_id:  Uuid,
  pub user_id:    Uuid,
  pub book_id:    Uuid,
  pub status:     ReadStatus,
  /// Set when the row is first created; immutable across status changes.
  pub created_at: DateTime<Utc>,
}

// ─── Rating ──────────────────────────────────────────────────────────────────

/// One user's star rating for one book. Unique per (book, user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
  pub rating_id:  Uuid,
  pub book_id:    Uuid,
  pub user_id:    Uuid,
  /// Always in 1..=5.
  pub stars:      u8,
  /// Set on first creation; an upsert that replaces `stars` keeps it.
  pub created_at: DateTime<Utc>,
}

/// Inclusive range of valid star values.
pub const STARS_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

// ─── Profile view ────────────────────────────────────────────────────────────

/// One entry on a user's shelf: the status row joined with its book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelfEntry {
  pub status: UserBookStatus,
  pub book:   Book,
}

/// The computed profile read model: shelf entries filtered to one status,
/// plus overall counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
  /// The status the entries are filtered to.
  pub filter:      ReadStatus,
  pub entries:     Vec<ShelfEntry>,
  /// Total number of books the user has marked `read` (any filter).
  pub read_count:  usize,
  /// Total number of ratings the user has submitted.
  pub rated_count: usize,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_parse_roundtrip() {
    for s in [ReadStatus::Read, ReadStatus::Want, ReadStatus::Reading] {
      assert_eq!(ReadStatus::parse(s.as_str()), Some(s));
    }
    assert_eq!(ReadStatus::parse("finished"), None);
  }
}
