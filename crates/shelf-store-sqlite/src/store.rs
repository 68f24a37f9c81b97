//! [`SqliteStore`] — the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use shelf_core::{
  account::{NewUser, User, UserProfile},
  catalog::{Author, Book, BookDetail, Genre, NewAuthor, NewBook, RatedBook},
  shelf::{
    ProfileView, Rating, ReadStatus, STARS_RANGE, ShelfEntry, UserBookStatus,
  },
  store::{BookPage, BookQuery, CatalogStore, PAGE_SIZE, SortKey},
};

use crate::{
  Error, Result,
  encode::{
    RawAuthor, RawBook, RawGenre, RawRating, RawStatus, RawUser, encode_dt,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Shelf catalog store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// `SELECT 1` existence probe with a single uuid parameter.
  async fn exists(&self, sql: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![id_str], |_| Ok(true))
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  async fn book_exists(&self, book_id: Uuid) -> Result<bool> {
    self
      .exists("SELECT 1 FROM books WHERE book_id = ?1", book_id)
      .await
  }

  /// Whether (user, book) carries a `read` status — the rating gate.
  async fn has_read_status(&self, user_id: Uuid, book_id: Uuid) -> Result<bool> {
    let user_str = encode_uuid(user_id);
    let book_str = encode_uuid(book_id);
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM book_statuses
               WHERE user_id = ?1 AND book_id = ?2 AND status = 'read'",
              rusqlite::params![user_str, book_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Catalog management ────────────────────────────────────────────────────

  async fn add_author(&self, input: NewAuthor) -> Result<Author> {
    let author = Author {
      author_id:  Uuid::new_v4(),
      name:       input.name,
      country:    input.country,
      birth_year: input.birth_year,
    };

    let id_str  = encode_uuid(author.author_id);
    let name    = author.name.clone();
    let country = author.country.clone();
    let year    = author.birth_year;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO authors (author_id, name, country, birth_year)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, country, year],
        )?;
        Ok(())
      })
      .await?;

    Ok(author)
  }

  async fn list_authors(&self) -> Result<Vec<Author>> {
    let raws: Vec<RawAuthor> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT author_id, name, country, birth_year
           FROM authors ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawAuthor {
              author_id:  row.get(0)?,
              name:       row.get(1)?,
              country:    row.get(2)?,
              birth_year: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuthor::into_author).collect()
  }

  async fn add_genre(&self, name: String) -> Result<Genre> {
    let genre = Genre { genre_id: Uuid::new_v4(), name };

    let id_str   = encode_uuid(genre.genre_id);
    let name_ins = genre.name.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO genres (genre_id, name) VALUES (?1, ?2)",
          rusqlite::params![id_str, name_ins],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from);

    match outcome {
      Ok(()) => Ok(genre),
      Err(e) if e.is_constraint_violation() => {
        Err(shelf_core::Error::DuplicateGenre(genre.name).into())
      }
      Err(e) => Err(e),
    }
  }

  async fn list_genres(&self) -> Result<Vec<Genre>> {
    let raws: Vec<RawGenre> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT genre_id, name FROM genres ORDER BY name")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawGenre { genre_id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGenre::into_genre).collect()
  }

  async fn add_book(&self, input: NewBook) -> Result<Book> {
    if !self
      .exists("SELECT 1 FROM authors WHERE author_id = ?1", input.author_id)
      .await?
    {
      return Err(shelf_core::Error::AuthorNotFound(input.author_id).into());
    }
    for gid in &input.genre_ids {
      if !self
        .exists("SELECT 1 FROM genres WHERE genre_id = ?1", *gid)
        .await?
      {
        return Err(shelf_core::Error::GenreNotFound(*gid).into());
      }
    }

    let book = Book {
      book_id:     Uuid::new_v4(),
      title:       input.title,
      author_id:   input.author_id,
      year:        input.year,
      isbn:        input.isbn,
      description: input.description,
      cover:       input.cover,
    };

    let book_id_str   = encode_uuid(book.book_id);
    let author_id_str = encode_uuid(book.author_id);
    let title         = book.title.clone();
    let year          = book.year;
    let isbn          = book.isbn.clone();
    let description   = book.description.clone();
    let cover         = book.cover.clone();
    let genre_strs: Vec<String> =
      input.genre_ids.iter().copied().map(encode_uuid).collect();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO books
             (book_id, title, author_id, year, isbn, description, cover)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            book_id_str,
            title,
            author_id_str,
            year,
            isbn,
            description,
            cover,
          ],
        )?;
        for gid in &genre_strs {
          tx.execute(
            "INSERT INTO book_genres (book_id, genre_id) VALUES (?1, ?2)",
            rusqlite::params![book_id_str, gid],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(Error::from);

    match outcome {
      Ok(()) => Ok(book),
      Err(e) if e.is_constraint_violation() => {
        Err(shelf_core::Error::DuplicateIsbn(book.isbn).into())
      }
      Err(e) => Err(e),
    }
  }

  async fn get_book(&self, id: Uuid) -> Result<Option<Book>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawBook> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM books b WHERE b.book_id = ?1",
                RawBook::columns("b")
              ),
              rusqlite::params![id_str],
              RawBook::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBook::into_book).transpose()
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  async fn list_books(&self, query: &BookQuery) -> Result<BookPage> {
    let title_pat  = query.title.as_deref().map(|t| format!("%{t}%"));
    let author_pat = query.author.as_deref().map(|a| format!("%{a}%"));
    let genre_str  = query.genre.map(encode_uuid);
    let year_from  = query.year_from;
    let year_to    = query.year_to;

    let order_clause = match query.sort {
      SortKey::Title => "b.title",
      SortKey::Year => "b.year, b.title",
    };

    // Saturating arithmetic: an absurd page number must degrade into an
    // ordinary out-of-range page, never overflow.
    let page        = query.page.max(1);
    let limit       = PAGE_SIZE as i64;
    let offset_rows = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    let offset      = offset_rows.min(i64::MAX as usize) as i64;

    // All filter parameters are always bound; a NULL parameter disables its
    // predicate. DISTINCT collapses the fan-out from the genre join.
    let joins = "
       FROM books b
       JOIN authors a           ON a.author_id = b.author_id
       LEFT JOIN book_genres bg ON bg.book_id = b.book_id";
    let filters = "
       WHERE (?1 IS NULL OR b.title LIKE ?1)
         AND (?2 IS NULL OR a.name  LIKE ?2)
         AND (?3 IS NULL OR bg.genre_id = ?3)
         AND (?4 IS NULL OR b.year >= ?4)
         AND (?5 IS NULL OR b.year <= ?5)";

    let (raws, total): (Vec<(RawBook, Option<f64>)>, usize) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(DISTINCT b.book_id) {joins} {filters}"),
          rusqlite::params![title_pat, author_pat, genre_str, year_from, year_to],
          |row| row.get(0),
        )?;

        let sql = format!(
          "SELECT DISTINCT {cols}, r.avg_stars
           {joins}
           LEFT JOIN (SELECT book_id, AVG(stars) AS avg_stars
                      FROM ratings GROUP BY book_id) r
                  ON r.book_id = b.book_id
           {filters}
           ORDER BY {order_clause}
           LIMIT ?6 OFFSET ?7",
          cols = RawBook::columns("b"),
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              title_pat, author_pat, genre_str, year_from, year_to, limit,
              offset,
            ],
            |row| Ok((RawBook::from_row(row)?, row.get::<_, Option<f64>>(7)?)),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total as usize))
      })
      .await?;

    let books = raws
      .into_iter()
      .map(|(raw, avg)| {
        Ok(RatedBook { book: raw.into_book()?, avg_rating: avg })
      })
      .collect::<Result<Vec<_>>>()?;

    // An out-of-range page is empty and reports neither neighbour.
    let in_range = offset_rows < total;
    Ok(BookPage {
      books,
      total_count: total,
      page,
      has_next: page.saturating_mul(PAGE_SIZE) < total,
      has_previous: in_range && page > 1,
    })
  }

  async fn book_detail(
    &self,
    book_id: Uuid,
    viewer: Option<Uuid>,
  ) -> Result<Option<BookDetail>> {
    let book = match self.get_book(book_id).await? {
      Some(b) => b,
      None => return Ok(None),
    };

    let book_id_str   = encode_uuid(book_id);
    let author_id_str = encode_uuid(book.author_id);
    let viewer_str    = viewer.map(encode_uuid);

    type Overlay = (Option<RawRating>, bool);
    let (raw_author, raw_genres, avg, (raw_rating, has_read)): (
      RawAuthor,
      Vec<RawGenre>,
      Option<f64>,
      Overlay,
    ) = self
      .conn
      .call(move |conn| {
        let author = conn.query_row(
          "SELECT author_id, name, country, birth_year
           FROM authors WHERE author_id = ?1",
          rusqlite::params![author_id_str],
          |row| {
            Ok(RawAuthor {
              author_id:  row.get(0)?,
              name:       row.get(1)?,
              country:    row.get(2)?,
              birth_year: row.get(3)?,
            })
          },
        )?;

        let mut stmt = conn.prepare(
          "SELECT g.genre_id, g.name
           FROM genres g
           JOIN book_genres bg ON bg.genre_id = g.genre_id
           WHERE bg.book_id = ?1
           ORDER BY g.name",
        )?;
        let genres = stmt
          .query_map(rusqlite::params![book_id_str], |row| {
            Ok(RawGenre { genre_id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let avg: Option<f64> = conn.query_row(
          "SELECT AVG(stars) FROM ratings WHERE book_id = ?1",
          rusqlite::params![book_id_str],
          |row| row.get(0),
        )?;

        let overlay: Overlay = match &viewer_str {
          None => (None, false),
          Some(user_str) => {
            let rating = conn
              .query_row(
                "SELECT rating_id, book_id, user_id, stars, created_at
                 FROM ratings WHERE book_id = ?1 AND user_id = ?2",
                rusqlite::params![book_id_str, user_str],
                RawRating::from_row,
              )
              .optional()?;
            let has_read: bool = conn
              .query_row(
                "SELECT 1 FROM book_statuses
                 WHERE user_id = ?1 AND book_id = ?2 AND status = 'read'",
                rusqlite::params![user_str, book_id_str],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false);
            (rating, has_read)
          }
        };

        Ok((author, genres, avg, overlay))
      })
      .await?;

    Ok(Some(BookDetail {
      book,
      author: raw_author.into_author()?,
      genres: raw_genres
        .into_iter()
        .map(RawGenre::into_genre)
        .collect::<Result<Vec<_>>>()?,
      avg_rating: avg,
      user_rating: raw_rating.map(RawRating::into_rating).transpose()?,
      has_read,
    }))
  }

  // ── Read/rate workflow ────────────────────────────────────────────────────

  async fn set_status(
    &self,
    user_id: Uuid,
    book_id: Uuid,
    status: ReadStatus,
  ) -> Result<UserBookStatus> {
    if !self.book_exists(book_id).await? {
      return Err(shelf_core::Error::BookNotFound(book_id).into());
    }

    let status_id_str = encode_uuid(Uuid::new_v4());
    let user_str      = encode_uuid(user_id);
    let book_str      = encode_uuid(book_id);
    let status_str    = encode_status(status).to_owned();
    let now_str       = encode_dt(Utc::now());

    // The upsert keeps the original row id and created_at on conflict, so
    // repeated shelving actions never duplicate the (user, book) row.
    let raw: RawStatus = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO book_statuses
             (status_id, user_id, book_id, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (user_id, book_id)
             DO UPDATE SET status = excluded.status
           RETURNING status_id, user_id, book_id, status, created_at",
          rusqlite::params![status_id_str, user_str, book_str, status_str, now_str],
          |row| {
            Ok(RawStatus {
              status_id:  row.get(0)?,
              user_id:    row.get(1)?,
              book_id:    row.get(2)?,
              status:     row.get(3)?,
              created_at: row.get(4)?,
            })
          },
        )?)
      })
      .await?;

    raw.into_status()
  }

  async fn rate(
    &self,
    user_id: Uuid,
    book_id: Uuid,
    stars: u8,
  ) -> Result<(Rating, bool)> {
    if !STARS_RANGE.contains(&stars) {
      return Err(shelf_core::Error::InvalidStars(stars).into());
    }
    if !self.book_exists(book_id).await? {
      return Err(shelf_core::Error::BookNotFound(book_id).into());
    }
    // Gate: rating is causally downstream of a completed read.
    if !self.has_read_status(user_id, book_id).await? {
      return Err(shelf_core::Error::NotMarkedRead { user_id, book_id }.into());
    }

    let rating_id_str = encode_uuid(Uuid::new_v4());
    let user_str      = encode_uuid(user_id);
    let book_str      = encode_uuid(book_id);
    let now_str       = encode_dt(Utc::now());

    let (raw, created): (RawRating, bool) = self
      .conn
      .call(move |conn| {
        let existed: bool = conn
          .query_row(
            "SELECT 1 FROM ratings WHERE book_id = ?1 AND user_id = ?2",
            rusqlite::params![book_str, user_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        // A racing first insert flips the conflict branch, not the result:
        // either way exactly one row survives with the latest stars.
        let raw = conn.query_row(
          "INSERT INTO ratings (rating_id, book_id, user_id, stars, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (book_id, user_id)
             DO UPDATE SET stars = excluded.stars
           RETURNING rating_id, book_id, user_id, stars, created_at",
          rusqlite::params![rating_id_str, book_str, user_str, stars, now_str],
          RawRating::from_row,
        )?;

        Ok((raw, !existed))
      })
      .await?;

    Ok((raw.into_rating()?, created))
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      username:      input.username,
      first_name:    input.first_name,
      last_name:     input.last_name,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let id_str     = encode_uuid(user.user_id);
    let username   = user.username.clone();
    let first_name = user.first_name.clone();
    let last_name  = user.last_name.clone();
    let hash       = user.password_hash.clone();
    let at_str     = encode_dt(user.created_at);
    let birth_year = input.birth_year;
    let city       = input.city;

    // User and profile are one transaction: no orphan user survives a
    // failure partway through.
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO users
             (user_id, username, first_name, last_name, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, username, first_name, last_name, hash, at_str],
        )?;
        tx.execute(
          "INSERT INTO profiles (user_id, birth_year, city)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, birth_year, city],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(Error::from);

    match outcome {
      Ok(()) => Ok(user),
      Err(e) if e.is_constraint_violation() => {
        Err(shelf_core::Error::UsernameTaken(user.username).into())
      }
      Err(e) => Err(e),
    }
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, first_name, last_name,
                      password_hash, created_at
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, first_name, last_name,
                      password_hash, created_at
               FROM users WHERE username = ?1",
              rusqlite::params![username],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
    let id_str = encode_uuid(user_id);

    let row: Option<(String, Option<i32>, Option<String>)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, birth_year, city FROM profiles WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(id, birth_year, city)| {
        Ok(UserProfile {
          user_id: crate::encode::decode_uuid(&id)?,
          birth_year,
          city,
        })
      })
      .transpose()
  }

  async fn profile_view(
    &self,
    user_id: Uuid,
    filter: ReadStatus,
  ) -> Result<ProfileView> {
    if self.get_user(user_id).await?.is_none() {
      return Err(shelf_core::Error::UserNotFound(user_id).into());
    }

    let user_str   = encode_uuid(user_id);
    let filter_str = encode_status(filter).to_owned();

    let (raw_entries, read_count, rated_count): (
      Vec<(RawStatus, RawBook)>,
      usize,
      usize,
    ) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT s.status_id, s.user_id, s.book_id, s.status, s.created_at,
                  {cols}
           FROM book_statuses s
           JOIN books b ON b.book_id = s.book_id
           WHERE s.user_id = ?1 AND s.status = ?2
           ORDER BY s.created_at DESC",
          cols = RawBook::columns("b"),
        ))?;
        let entries = stmt
          .query_map(rusqlite::params![user_str, filter_str], |row| {
            let status = RawStatus {
              status_id:  row.get(0)?,
              user_id:    row.get(1)?,
              book_id:    row.get(2)?,
              status:     row.get(3)?,
              created_at: row.get(4)?,
            };
            let book = RawBook {
              book_id:     row.get(5)?,
              title:       row.get(6)?,
              author_id:   row.get(7)?,
              year:        row.get(8)?,
              isbn:        row.get(9)?,
              description: row.get(10)?,
              cover:       row.get(11)?,
            };
            Ok((status, book))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let read_count: i64 = conn.query_row(
          "SELECT COUNT(*) FROM book_statuses
           WHERE user_id = ?1 AND status = 'read'",
          rusqlite::params![user_str],
          |row| row.get(0),
        )?;

        let rated_count: i64 = conn.query_row(
          "SELECT COUNT(*) FROM ratings WHERE user_id = ?1",
          rusqlite::params![user_str],
          |row| row.get(0),
        )?;

        Ok((entries, read_count as usize, rated_count as usize))
      })
      .await?;

    let entries = raw_entries
      .into_iter()
      .map(|(raw_status, raw_book)| {
        Ok(ShelfEntry {
          status: raw_status.into_status()?,
          book:   raw_book.into_book()?,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(ProfileView { filter, entries, read_count, rated_count })
  }
}
