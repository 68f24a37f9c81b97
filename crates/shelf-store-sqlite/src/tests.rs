//! Integration tests for `SqliteStore` against an in-memory database.

use shelf_core::{
  account::NewUser,
  catalog::{Author, Genre, NewAuthor, NewBook},
  shelf::ReadStatus,
  store::{BookQuery, CatalogStore, PAGE_SIZE, SortKey},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn author(s: &SqliteStore, name: &str) -> Author {
  s.add_author(NewAuthor {
    name:       name.into(),
    country:    None,
    birth_year: None,
  })
  .await
  .unwrap()
}

async fn genre(s: &SqliteStore, name: &str) -> Genre {
  s.add_genre(name.into()).await.unwrap()
}

fn new_book(
  title: &str,
  author_id: Uuid,
  year: Option<i32>,
  isbn: &str,
  genre_ids: Vec<Uuid>,
) -> NewBook {
  NewBook {
    title: title.into(),
    author_id,
    year,
    isbn: isbn.into(),
    genre_ids,
    description: None,
    cover: None,
  }
}

async fn user(s: &SqliteStore, username: &str) -> shelf_core::account::User {
  s.create_user(NewUser {
    username:      username.into(),
    first_name:    "Jonas".into(),
    last_name:     "Jonaitis".into(),
    password_hash: "$argon2id$stub".into(),
    birth_year:    Some(1990),
    city:          Some("Vilnius".into()),
  })
  .await
  .unwrap()
}

// ─── Catalog management ──────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_book() {
  let s = store().await;
  let a = author(&s, "Jane Austen").await;
  let book = s
    .add_book(new_book("Emma", a.author_id, Some(1815), "111", vec![]))
    .await
    .unwrap();

  let fetched = s.get_book(book.book_id).await.unwrap().unwrap();
  assert_eq!(fetched.title, "Emma");
  assert_eq!(fetched.author_id, a.author_id);
  assert_eq!(fetched.isbn, "111");
}

#[tokio::test]
async fn get_book_missing_returns_none() {
  let s = store().await;
  assert!(s.get_book(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_isbn_rejected() {
  let s = store().await;
  let a = author(&s, "A").await;
  s.add_book(new_book("One", a.author_id, None, "123", vec![]))
    .await
    .unwrap();

  let err = s
    .add_book(new_book("Two", a.author_id, None, "123", vec![]))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(shelf_core::Error::DuplicateIsbn(isbn)) if isbn == "123"
  ));
}

#[tokio::test]
async fn duplicate_genre_rejected() {
  let s = store().await;
  genre(&s, "fantasy").await;
  let err = s.add_genre("fantasy".into()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(shelf_core::Error::DuplicateGenre(_))
  ));
}

#[tokio::test]
async fn add_book_with_unknown_author_errors() {
  let s = store().await;
  let err = s
    .add_book(new_book("Ghost", Uuid::new_v4(), None, "999", vec![]))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(shelf_core::Error::AuthorNotFound(_))
  ));
}

#[tokio::test]
async fn add_book_with_unknown_genre_errors() {
  let s = store().await;
  let a = author(&s, "A").await;
  let err = s
    .add_book(new_book("X", a.author_id, None, "1", vec![Uuid::new_v4()]))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(shelf_core::Error::GenreNotFound(_))
  ));
}

// ─── Listing query ───────────────────────────────────────────────────────────

/// Seed a small catalog: five books, two authors, two genres.
async fn seed_catalog(s: &SqliteStore) -> (Author, Author, Genre, Genre) {
  let austen = author(s, "Jane Austen").await;
  let orwell = author(s, "George Orwell").await;
  let classic = genre(s, "classic").await;
  let dystopia = genre(s, "dystopia").await;

  s.add_book(new_book(
    "Emma",
    austen.author_id,
    Some(1815),
    "i-emma",
    vec![classic.genre_id],
  ))
  .await
  .unwrap();
  s.add_book(new_book(
    "Persuasion",
    austen.author_id,
    Some(1817),
    "i-pers",
    vec![classic.genre_id],
  ))
  .await
  .unwrap();
  s.add_book(new_book(
    "Animal Farm",
    orwell.author_id,
    Some(1945),
    "i-farm",
    vec![classic.genre_id, dystopia.genre_id],
  ))
  .await
  .unwrap();
  s.add_book(new_book(
    "1984",
    orwell.author_id,
    Some(1949),
    "i-1984",
    vec![dystopia.genre_id],
  ))
  .await
  .unwrap();
  s.add_book(new_book("Undated", orwell.author_id, None, "i-und", vec![]))
    .await
    .unwrap();

  (austen, orwell, classic, dystopia)
}

#[tokio::test]
async fn list_unfiltered_orders_by_title() {
  let s = store().await;
  seed_catalog(&s).await;

  let page = s.list_books(&BookQuery::default()).await.unwrap();
  assert_eq!(page.total_count, 5);
  assert_eq!(page.books.len(), PAGE_SIZE);
  let titles: Vec<_> =
    page.books.iter().map(|rb| rb.book.title.as_str()).collect();
  assert_eq!(titles, ["1984", "Animal Farm", "Emma", "Persuasion"]);
  assert!(page.has_next);
  assert!(!page.has_previous);
}

#[tokio::test]
async fn title_filter_is_substring_match() {
  let s = store().await;
  seed_catalog(&s).await;

  let page = s
    .list_books(&BookQuery {
      title: Some("ani".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.total_count, 1);
  assert_eq!(page.books[0].book.title, "Animal Farm");
}

#[tokio::test]
async fn author_filter_is_substring_match() {
  let s = store().await;
  seed_catalog(&s).await;

  let page = s
    .list_books(&BookQuery {
      author: Some("orwell".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.total_count, 3);
}

#[tokio::test]
async fn genre_filter_matches_linked_books_once() {
  let s = store().await;
  let (_, _, classic, dystopia) = seed_catalog(&s).await;

  // "Animal Farm" carries both genres but must appear once per listing.
  let page = s
    .list_books(&BookQuery {
      genre: Some(classic.genre_id),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.total_count, 3);
  let farms = page
    .books
    .iter()
    .filter(|rb| rb.book.title == "Animal Farm")
    .count();
  assert_eq!(farms, 1);

  let page = s
    .list_books(&BookQuery {
      genre: Some(dystopia.genre_id),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.total_count, 2);
}

#[tokio::test]
async fn year_bounds_are_inclusive_and_skip_undated() {
  let s = store().await;
  seed_catalog(&s).await;

  let page = s
    .list_books(&BookQuery {
      year_from: Some(1817),
      year_to:   Some(1945),
      ..Default::default()
    })
    .await
    .unwrap();
  let titles: Vec<_> =
    page.books.iter().map(|rb| rb.book.title.as_str()).collect();
  assert_eq!(titles, ["Animal Farm", "Persuasion"]);
}

#[tokio::test]
async fn filters_combine_with_and() {
  let s = store().await;
  let (_, _, classic, _) = seed_catalog(&s).await;

  let page = s
    .list_books(&BookQuery {
      author:    Some("Austen".into()),
      genre:     Some(classic.genre_id),
      year_from: Some(1816),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(page.total_count, 1);
  assert_eq!(page.books[0].book.title, "Persuasion");
}

#[tokio::test]
async fn year_sort_breaks_ties_by_title() {
  let s = store().await;
  let (austen, ..) = seed_catalog(&s).await;
  // Second book from 1815 to force a tie.
  s.add_book(new_book(
    "Almanac",
    austen.author_id,
    Some(1815),
    "i-alm",
    vec![],
  ))
  .await
  .unwrap();

  let page = s
    .list_books(&BookQuery {
      year_from: Some(1800),
      sort:      SortKey::Year,
      ..Default::default()
    })
    .await
    .unwrap();
  let titles: Vec<_> =
    page.books.iter().map(|rb| rb.book.title.as_str()).collect();
  assert_eq!(titles, ["Almanac", "Emma", "Persuasion", "Animal Farm"]);
}

#[tokio::test]
async fn second_page_and_pagination_flags() {
  let s = store().await;
  seed_catalog(&s).await;

  let page = s
    .list_books(&BookQuery { page: 2, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.total_count, 5);
  assert_eq!(page.books.len(), 1);
  assert_eq!(page.books[0].book.title, "Undated");
  assert!(!page.has_next);
  assert!(page.has_previous);
}

#[tokio::test]
async fn out_of_range_page_is_empty_not_an_error() {
  let s = store().await;
  seed_catalog(&s).await;

  let page = s
    .list_books(&BookQuery { page: 7, ..Default::default() })
    .await
    .unwrap();
  assert!(page.books.is_empty());
  assert_eq!(page.total_count, 5);
  assert!(!page.has_next);
  assert!(!page.has_previous);
}

#[tokio::test]
async fn extreme_page_number_behaves_like_any_out_of_range_page() {
  let s = store().await;
  seed_catalog(&s).await;

  for n in [usize::MAX / PAGE_SIZE, usize::MAX] {
    let page = s
      .list_books(&BookQuery { page: n, ..Default::default() })
      .await
      .unwrap();
    assert!(page.books.is_empty());
    assert_eq!(page.total_count, 5);
    assert!(!page.has_next);
    assert!(!page.has_previous);
  }
}

#[tokio::test]
async fn listing_annotates_average_rating() {
  let s = store().await;
  let a = author(&s, "A").await;
  let book = s
    .add_book(new_book("Rated", a.author_id, None, "r1", vec![]))
    .await
    .unwrap();
  s.add_book(new_book("Unrated", a.author_id, None, "r2", vec![]))
    .await
    .unwrap();

  let u1 = user(&s, "alice").await;
  let u2 = user(&s, "bob").await;
  for u in [&u1, &u2] {
    s.set_status(u.user_id, book.book_id, ReadStatus::Read)
      .await
      .unwrap();
  }
  s.rate(u1.user_id, book.book_id, 5).await.unwrap();
  s.rate(u2.user_id, book.book_id, 2).await.unwrap();

  let page = s.list_books(&BookQuery::default()).await.unwrap();
  let rated = page
    .books
    .iter()
    .find(|rb| rb.book.title == "Rated")
    .unwrap();
  let unrated = page
    .books
    .iter()
    .find(|rb| rb.book.title == "Unrated")
    .unwrap();
  assert_eq!(rated.avg_rating, Some(3.5));
  assert_eq!(unrated.avg_rating, None);
}

// ─── Book detail ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn detail_missing_book_returns_none() {
  let s = store().await;
  assert!(s.book_detail(Uuid::new_v4(), None).await.unwrap().is_none());
}

#[tokio::test]
async fn detail_without_viewer_has_no_overlay() {
  let s = store().await;
  let (_, _, _, dystopia) = seed_catalog(&s).await;
  let page = s
    .list_books(&BookQuery {
      title: Some("1984".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  let book_id = page.books[0].book.book_id;

  let detail = s.book_detail(book_id, None).await.unwrap().unwrap();
  assert_eq!(detail.author.name, "George Orwell");
  assert_eq!(detail.genres.len(), 1);
  assert_eq!(detail.genres[0].genre_id, dystopia.genre_id);
  assert!(detail.user_rating.is_none());
  assert!(!detail.has_read);
}

#[tokio::test]
async fn detail_with_viewer_shows_own_rating_and_read_flag() {
  let s = store().await;
  let a = author(&s, "A").await;
  let book = s
    .add_book(new_book("Mine", a.author_id, None, "m1", vec![]))
    .await
    .unwrap();
  let me = user(&s, "me").await;
  let other = user(&s, "other").await;

  s.set_status(me.user_id, book.book_id, ReadStatus::Read)
    .await
    .unwrap();
  s.rate(me.user_id, book.book_id, 4).await.unwrap();

  let detail = s
    .book_detail(book.book_id, Some(me.user_id))
    .await
    .unwrap()
    .unwrap();
  assert!(detail.has_read);
  assert_eq!(detail.user_rating.as_ref().unwrap().stars, 4);
  assert_eq!(detail.avg_rating, Some(4.0));

  // A different viewer sees the average but not my overlay.
  let detail = s
    .book_detail(book.book_id, Some(other.user_id))
    .await
    .unwrap()
    .unwrap();
  assert!(!detail.has_read);
  assert!(detail.user_rating.is_none());
  assert_eq!(detail.avg_rating, Some(4.0));
}

// ─── Read/rate workflow ──────────────────────────────────────────────────────

#[tokio::test]
async fn mark_as_read_is_idempotent() {
  let s = store().await;
  let a = author(&s, "A").await;
  let book = s
    .add_book(new_book("B", a.author_id, None, "b1", vec![]))
    .await
    .unwrap();
  let u = user(&s, "reader").await;

  let first = s
    .set_status(u.user_id, book.book_id, ReadStatus::Read)
    .await
    .unwrap();
  let second = s
    .set_status(u.user_id, book.book_id, ReadStatus::Read)
    .await
    .unwrap();

  assert_eq!(first.status, ReadStatus::Read);
  assert_eq!(second.status_id, first.status_id);
  assert_eq!(second.created_at, first.created_at);

  let view = s.profile_view(u.user_id, ReadStatus::Read).await.unwrap();
  assert_eq!(view.entries.len(), 1);
  assert_eq!(view.read_count, 1);
}

#[tokio::test]
async fn status_transition_keeps_created_at() {
  let s = store().await;
  let a = author(&s, "A").await;
  let book = s
    .add_book(new_book("B", a.author_id, None, "b1", vec![]))
    .await
    .unwrap();
  let u = user(&s, "reader").await;

  let want = s
    .set_status(u.user_id, book.book_id, ReadStatus::Want)
    .await
    .unwrap();
  let read = s
    .set_status(u.user_id, book.book_id, ReadStatus::Read)
    .await
    .unwrap();

  assert_eq!(read.status, ReadStatus::Read);
  assert_eq!(read.status_id, want.status_id);
  assert_eq!(read.created_at, want.created_at);
}

#[tokio::test]
async fn set_status_unknown_book_errors() {
  let s = store().await;
  let u = user(&s, "reader").await;
  let err = s
    .set_status(u.user_id, Uuid::new_v4(), ReadStatus::Read)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(shelf_core::Error::BookNotFound(_))
  ));
}

#[tokio::test]
async fn rating_requires_read_status() {
  let s = store().await;
  let a = author(&s, "A").await;
  let book = s
    .add_book(new_book("B", a.author_id, None, "b1", vec![]))
    .await
    .unwrap();
  let u = user(&s, "hasty").await;

  // No status at all.
  let err = s.rate(u.user_id, book.book_id, 5).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(shelf_core::Error::NotMarkedRead { .. })
  ));

  // "reading" is not enough either.
  s.set_status(u.user_id, book.book_id, ReadStatus::Reading)
    .await
    .unwrap();
  let err = s.rate(u.user_id, book.book_id, 5).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(shelf_core::Error::NotMarkedRead { .. })
  ));

  // The failed attempts wrote nothing.
  let view = s.profile_view(u.user_id, ReadStatus::Read).await.unwrap();
  assert_eq!(view.rated_count, 0);
}

#[tokio::test]
async fn rating_upsert_keeps_one_row_and_first_created_at() {
  let s = store().await;
  let a = author(&s, "A").await;
  let book = s
    .add_book(new_book("B", a.author_id, None, "123", vec![]))
    .await
    .unwrap();
  let u = user(&s, "rater").await;

  s.set_status(u.user_id, book.book_id, ReadStatus::Read)
    .await
    .unwrap();

  let (first, created) = s.rate(u.user_id, book.book_id, 4).await.unwrap();
  assert!(created);
  assert_eq!(first.stars, 4);

  let (second, created) = s.rate(u.user_id, book.book_id, 2).await.unwrap();
  assert!(!created);
  assert_eq!(second.stars, 2);
  assert_eq!(second.rating_id, first.rating_id);
  assert_eq!(second.created_at, first.created_at);

  let view = s.profile_view(u.user_id, ReadStatus::Read).await.unwrap();
  assert_eq!(view.rated_count, 1);

  let detail = s
    .book_detail(book.book_id, Some(u.user_id))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(detail.user_rating.unwrap().stars, 2);
  assert_eq!(detail.avg_rating, Some(2.0));
}

#[tokio::test]
async fn rating_rejects_out_of_range_stars() {
  let s = store().await;
  let a = author(&s, "A").await;
  let book = s
    .add_book(new_book("B", a.author_id, None, "b1", vec![]))
    .await
    .unwrap();
  let u = user(&s, "rater").await;
  s.set_status(u.user_id, book.book_id, ReadStatus::Read)
    .await
    .unwrap();

  for stars in [0, 6] {
    let err = s.rate(u.user_id, book.book_id, stars).await.unwrap_err();
    assert!(matches!(
      err,
      crate::Error::Core(shelf_core::Error::InvalidStars(_))
    ));
  }
}

#[tokio::test]
async fn rating_unknown_book_errors() {
  let s = store().await;
  let u = user(&s, "rater").await;
  let err = s.rate(u.user_id, Uuid::new_v4(), 3).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(shelf_core::Error::BookNotFound(_))
  ));
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_user_writes_user_and_profile() {
  let s = store().await;
  let u = user(&s, "jonas").await;

  let fetched = s.get_user_by_username("jonas").await.unwrap().unwrap();
  assert_eq!(fetched.user_id, u.user_id);
  assert_eq!(fetched.first_name, "Jonas");

  let profile = s.get_profile(u.user_id).await.unwrap().unwrap();
  assert_eq!(profile.birth_year, Some(1990));
  assert_eq!(profile.city.as_deref(), Some("Vilnius"));
}

#[tokio::test]
async fn duplicate_username_rejected() {
  let s = store().await;
  user(&s, "jonas").await;

  let err = s
    .create_user(NewUser {
      username:      "jonas".into(),
      first_name:    "Other".into(),
      last_name:     "Person".into(),
      password_hash: "$argon2id$stub".into(),
      birth_year:    None,
      city:          None,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(shelf_core::Error::UsernameTaken(name)) if name == "jonas"
  ));
}

#[tokio::test]
async fn registration_rolls_back_user_when_profile_insert_fails() {
  let s = store().await;

  // Force the second write of the transaction to fail.
  s.conn
    .call(|conn| {
      conn.execute_batch("DROP TABLE profiles")?;
      Ok(())
    })
    .await
    .unwrap();

  let result = s
    .create_user(NewUser {
      username:      "ghost".into(),
      first_name:    "G".into(),
      last_name:     "H".into(),
      password_hash: "$argon2id$stub".into(),
      birth_year:    None,
      city:          None,
    })
    .await;
  assert!(result.is_err());

  // The user insert must not survive on its own.
  let count: i64 = s
    .conn
    .call(|conn| {
      Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    })
    .await
    .unwrap();
  assert_eq!(count, 0);
}

#[tokio::test]
async fn profile_view_filters_by_status() {
  let s = store().await;
  let a = author(&s, "A").await;
  let read_book = s
    .add_book(new_book("Done", a.author_id, None, "d1", vec![]))
    .await
    .unwrap();
  let wanted = s
    .add_book(new_book("Later", a.author_id, None, "l1", vec![]))
    .await
    .unwrap();
  let u = user(&s, "reader").await;

  s.set_status(u.user_id, read_book.book_id, ReadStatus::Read)
    .await
    .unwrap();
  s.set_status(u.user_id, wanted.book_id, ReadStatus::Want)
    .await
    .unwrap();
  s.rate(u.user_id, read_book.book_id, 5).await.unwrap();

  let view = s.profile_view(u.user_id, ReadStatus::Read).await.unwrap();
  assert_eq!(view.entries.len(), 1);
  assert_eq!(view.entries[0].book.title, "Done");
  assert_eq!(view.read_count, 1);
  assert_eq!(view.rated_count, 1);

  let view = s.profile_view(u.user_id, ReadStatus::Want).await.unwrap();
  assert_eq!(view.entries.len(), 1);
  assert_eq!(view.entries[0].book.title, "Later");
  // Counters are totals, not filter-dependent.
  assert_eq!(view.read_count, 1);
  assert_eq!(view.rated_count, 1);
}

#[tokio::test]
async fn profile_view_unknown_user_errors() {
  let s = store().await;
  let err = s
    .profile_view(Uuid::new_v4(), ReadStatus::Read)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(shelf_core::Error::UserNotFound(_))
  ));
}

// ─── End-to-end scenario ─────────────────────────────────────────────────────

#[tokio::test]
async fn mark_then_rate_then_rerate_scenario() {
  let s = store().await;
  let a = author(&s, "A").await;
  let book = s
    .add_book(new_book("B", a.author_id, None, "123", vec![]))
    .await
    .unwrap();
  let u = user(&s, "u").await;

  let status = s
    .set_status(u.user_id, book.book_id, ReadStatus::Read)
    .await
    .unwrap();
  assert_eq!(status.status, ReadStatus::Read);

  let (r1, created) = s.rate(u.user_id, book.book_id, 4).await.unwrap();
  assert!(created);
  assert_eq!(r1.stars, 4);

  let (r2, created) = s.rate(u.user_id, book.book_id, 2).await.unwrap();
  assert!(!created);
  assert_eq!(r2.stars, 2);
  assert_eq!(r2.rating_id, r1.rating_id);

  let view = s.profile_view(u.user_id, ReadStatus::Read).await.unwrap();
  assert_eq!(view.rated_count, 1);
}
