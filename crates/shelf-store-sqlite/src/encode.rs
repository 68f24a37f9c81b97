//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Read statuses use their lowercase wire
//! names.

use chrono::{DateTime, Utc};
use shelf_core::{
  account::User,
  catalog::{Author, Book, Genre},
  shelf::{Rating, ReadStatus, UserBookStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ReadStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: ReadStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<ReadStatus> {
  ReadStatus::parse(s)
    .ok_or_else(|| shelf_core::Error::UnknownStatus(s.to_owned()).into())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `authors` row.
pub struct RawAuthor {
  pub author_id:  String,
  pub name:       String,
  pub country:    Option<String>,
  pub birth_year: Option<i32>,
}

impl RawAuthor {
  pub fn into_author(self) -> Result<Author> {
    Ok(Author {
      author_id:  decode_uuid(&self.author_id)?,
      name:       self.name,
      country:    self.country,
      birth_year: self.birth_year,
    })
  }
}

/// Raw strings read directly from a `genres` row.
pub struct RawGenre {
  pub genre_id: String,
  pub name:     String,
}

impl RawGenre {
  pub fn into_genre(self) -> Result<Genre> {
    Ok(Genre {
      genre_id: decode_uuid(&self.genre_id)?,
      name:     self.name,
    })
  }
}

/// Raw strings read directly from a `books` row.
pub struct RawBook {
  pub book_id:     String,
  pub title:       String,
  pub author_id:   String,
  pub year:        Option<i32>,
  pub isbn:        String,
  pub description: Option<String>,
  pub cover:       Option<String>,
}

impl RawBook {
  pub fn into_book(self) -> Result<Book> {
    Ok(Book {
      book_id:     decode_uuid(&self.book_id)?,
      title:       self.title,
      author_id:   decode_uuid(&self.author_id)?,
      year:        self.year,
      isbn:        self.isbn,
      description: self.description,
      cover:       self.cover,
    })
  }

  /// Column list matching the field order of [`RawBook`]; prefixed with the
  /// `books` table alias used by the query.
  pub fn columns(alias: &str) -> String {
    format!(
      "{a}.book_id, {a}.title, {a}.author_id, {a}.year, {a}.isbn, \
       {a}.description, {a}.cover",
      a = alias
    )
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      book_id:     row.get(0)?,
      title:       row.get(1)?,
      author_id:   row.get(2)?,
      year:        row.get(3)?,
      isbn:        row.get(4)?,
      description: row.get(5)?,
      cover:       row.get(6)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub first_name:    String,
  pub last_name:     String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      first_name:    self.first_name,
      last_name:     self.last_name,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      username:      row.get(1)?,
      first_name:    row.get(2)?,
      last_name:     row.get(3)?,
      password_hash: row.get(4)?,
      created_at:    row.get(5)?,
    })
  }
}

/// Raw strings read directly from a `book_statuses` row.
pub struct RawStatus {
  pub status_id:  String,
  pub user_id:    String,
  pub book_id:    String,
  pub status:     String,
  pub created_at: String,
}

impl RawStatus {
  pub fn into_status(self) -> Result<UserBookStatus> {
    Ok(UserBookStatus {
      status_id:  decode_uuid(&self.status_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      book_id:    decode_uuid(&self.book_id)?,
      status:     decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `ratings` row.
pub struct RawRating {
  pub rating_id:  String,
  pub book_id:    String,
  pub user_id:    String,
  pub stars:      i64,
  pub created_at: String,
}

impl RawRating {
  pub fn into_rating(self) -> Result<Rating> {
    Ok(Rating {
      rating_id:  decode_uuid(&self.rating_id)?,
      book_id:    decode_uuid(&self.book_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      stars:      self.stars as u8,
      created_at: decode_dt(&self.created_at)?,
    })
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      rating_id:  row.get(0)?,
      book_id:    row.get(1)?,
      user_id:    row.get(2)?,
      stars:      row.get(3)?,
      created_at: row.get(4)?,
    })
  }
}
