//! The `CatalogStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `shelf-store-sqlite`).
//! Higher layers (`shelf-api`, `shelf-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  account::{NewUser, User},
  catalog::{Author, Book, BookDetail, Genre, NewAuthor, NewBook, RatedBook},
  shelf::{ProfileView, Rating, ReadStatus, UserBookStatus},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Fixed number of listing rows per page.
pub const PAGE_SIZE: usize = 4;

/// Listing sort key. Anything the caller sends that is not a known key
/// silently falls back to [`SortKey::Title`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
  #[default]
  Title,
  Year,
}

impl SortKey {
  pub fn parse(s: Option<&str>) -> Self {
    match s {
      Some("year") => Self::Year,
      // "title", absent, and anything unrecognised all mean title order.
      _ => Self::Title,
    }
  }
}

/// Parameters for [`CatalogStore::list_books`]. All filters are optional and
/// combine with logical AND.
#[derive(Debug, Clone)]
pub struct BookQuery {
  /// Case-insensitive title substring.
  pub title:     Option<String>,
  /// Case-insensitive author-name substring.
  pub author:    Option<String>,
  /// Restrict to books linked to this genre.
  pub genre:     Option<Uuid>,
  /// Inclusive lower bound on publication year; unset years never match.
  pub year_from: Option<i32>,
  /// Inclusive upper bound on publication year.
  pub year_to:   Option<i32>,
  pub sort:      SortKey,
  /// 1-indexed page; values below 1 are treated as 1.
  pub page:      usize,
}

impl Default for BookQuery {
  fn default() -> Self {
    Self {
      title:     None,
      author:    None,
      genre:     None,
      year_from: None,
      year_to:   None,
      sort:      SortKey::default(),
      page:      1,
    }
  }
}

/// One page of listing results plus pagination metadata.
///
/// An out-of-range page is not an error: it has no rows and both `has_next`
/// and `has_previous` are false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookPage {
  pub books:        Vec<RatedBook>,
  /// Number of books matching the filters across all pages.
  pub total_count:  usize,
  pub page:         usize,
  pub has_next:     bool,
  pub has_previous: bool,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Shelf catalog backend.
///
/// Uniqueness invariants (one status and one rating per (user, book), unique
/// username/isbn/genre name) are delegated to the backend's constraints; a
/// racing duplicate write surfaces as the corresponding domain error, never
/// as a generic failure.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error
    + Into<crate::Error>
    + Send
    + Sync
    + 'static;

  // ── Catalog management ────────────────────────────────────────────────

  /// Create and persist a new author.
  fn add_author(
    &self,
    input: NewAuthor,
  ) -> impl Future<Output = Result<Author, Self::Error>> + Send + '_;

  fn list_authors(
    &self,
  ) -> impl Future<Output = Result<Vec<Author>, Self::Error>> + Send + '_;

  /// Create a genre. Errors with `DuplicateGenre` if the name is taken.
  fn add_genre(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Genre, Self::Error>> + Send + '_;

  fn list_genres(
    &self,
  ) -> impl Future<Output = Result<Vec<Genre>, Self::Error>> + Send + '_;

  /// Create a book and its genre links in one transaction.
  ///
  /// Errors with `AuthorNotFound`/`GenreNotFound` for dangling references
  /// and `DuplicateIsbn` if the isbn is already catalogued.
  fn add_book(
    &self,
    input: NewBook,
  ) -> impl Future<Output = Result<Book, Self::Error>> + Send + '_;

  /// Retrieve a book by id. Returns `None` if not found.
  fn get_book(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + '_;

  // ── Queries ───────────────────────────────────────────────────────────

  /// The listing query: filter, annotate with average rating, sort,
  /// paginate. Pure read.
  fn list_books<'a>(
    &'a self,
    query: &'a BookQuery,
  ) -> impl Future<Output = Result<BookPage, Self::Error>> + Send + 'a;

  /// Materialise the detail read model for one book, with the personal
  /// overlay for `viewer` when given. Returns `None` if the book does not
  /// exist.
  fn book_detail(
    &self,
    book_id: Uuid,
    viewer: Option<Uuid>,
  ) -> impl Future<Output = Result<Option<BookDetail>, Self::Error>> + Send + '_;

  // ── Read/rate workflow ────────────────────────────────────────────────

  /// Upsert the status row for (user, book). Creates the row with the given
  /// status or updates `status` in place; `created_at` is never touched
  /// after the first write. Errors with `BookNotFound`.
  fn set_status(
    &self,
    user_id: Uuid,
    book_id: Uuid,
    status: ReadStatus,
  ) -> impl Future<Output = Result<UserBookStatus, Self::Error>> + Send + '_;

  /// Upsert the rating for (book, user) and report whether it was newly
  /// created.
  ///
  /// Gate: requires an existing `read` status for the pair, else
  /// `NotMarkedRead` with no write. `stars` outside 1..=5 is
  /// `InvalidStars`, also with no write.
  fn rate(
    &self,
    user_id: Uuid,
    book_id: Uuid,
    stars: u8,
  ) -> impl Future<Output = Result<(Rating, bool), Self::Error>> + Send + '_;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Create the user row and its profile row in a single transaction —
  /// both succeed or both fail. Errors with `UsernameTaken`, including
  /// when a racing insert hits the unique constraint.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<crate::account::UserProfile>, Self::Error>>
  + Send
  + '_;

  /// Materialise the profile read model: shelf entries filtered to
  /// `filter`, plus total read and rated counts. Errors with
  /// `UserNotFound`.
  fn profile_view(
    &self,
    user_id: Uuid,
    filter: ReadStatus,
  ) -> impl Future<Output = Result<ProfileView, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_sort_key_falls_back_to_title() {
    assert_eq!(SortKey::parse(Some("title")), SortKey::Title);
    assert_eq!(SortKey::parse(Some("year")), SortKey::Year);
    assert_eq!(SortKey::parse(Some("isbn")), SortKey::Title);
    assert_eq!(SortKey::parse(Some("")), SortKey::Title);
    assert_eq!(SortKey::parse(None), SortKey::Title);
  }
}
