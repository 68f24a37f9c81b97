//! Catalog entities — authors, genres, books.
//!
//! These are administrator-managed: created and updated at any time, with no
//! workflow constraints. Referential integrity and uniqueness (isbn, genre
//! name) are enforced by the storage backend.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shelf::Rating;

// ─── Author ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
  pub author_id:  Uuid,
  pub name:       String,
  pub country:    Option<String>,
  pub birth_year: Option<i32>,
}

/// Input for creating an [`Author`]; the id is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuthor {
  pub name:       String,
  pub country:    Option<String>,
  pub birth_year: Option<i32>,
}

// ─── Genre ───────────────────────────────────────────────────────────────────

/// A genre label. Names are unique across the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
  pub genre_id: Uuid,
  pub name:     String,
}

// ─── Book ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
  pub book_id:     Uuid,
  pub title:       String,
  pub author_id:   Uuid,
  pub year:        Option<i32>,
  pub isbn:        String,
  pub description: Option<String>,
  /// Path or URL of the cover image; serving the bytes is not our concern.
  pub cover:       Option<String>,
}

/// Input for creating a [`Book`] together with its genre links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
  pub title:       String,
  pub author_id:   Uuid,
  pub year:        Option<i32>,
  pub isbn:        String,
  #[serde(default)]
  pub genre_ids:   Vec<Uuid>,
  pub description: Option<String>,
  pub cover:       Option<String>,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// A listing row: a book annotated with the mean of its ratings.
/// `avg_rating` is `None` when the book has no ratings at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatedBook {
  pub book:       Book,
  pub avg_rating: Option<f64>,
}

/// The computed detail view for one book — never stored, always derived.
///
/// `user_rating` and `has_read` form the personal overlay: populated only
/// when the detail query is made on behalf of an authenticated viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetail {
  pub book:        Book,
  pub author:      Author,
  pub genres:      Vec<Genre>,
  pub avg_rating:  Option<f64>,
  pub user_rating: Option<Rating>,
  pub has_read:    bool,
}
