//! SQL schema for the Shelf SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The UNIQUE constraints are the source of truth for the catalog's
/// uniqueness invariants: one status and one rating per (user, book), one
/// isbn per book, one name per genre, one username per user. The store
/// performs no locking of its own.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS authors (
    author_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    country     TEXT,
    birth_year  INTEGER
);

CREATE TABLE IF NOT EXISTS genres (
    genre_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS books (
    book_id     TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    author_id   TEXT NOT NULL REFERENCES authors(author_id) ON DELETE CASCADE,
    year        INTEGER,
    isbn        TEXT NOT NULL UNIQUE,
    description TEXT,
    cover       TEXT
);

CREATE TABLE IF NOT EXISTS book_genres (
    book_id     TEXT NOT NULL REFERENCES books(book_id)   ON DELETE CASCADE,
    genre_id    TEXT NOT NULL REFERENCES genres(genre_id) ON DELETE CASCADE,
    PRIMARY KEY (book_id, genre_id)
);

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

-- Exactly one per user; written in the same transaction as the user row.
CREATE TABLE IF NOT EXISTS profiles (
    user_id     TEXT PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
    birth_year  INTEGER,
    city        TEXT
);

CREATE TABLE IF NOT EXISTS book_statuses (
    status_id   TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    book_id     TEXT NOT NULL REFERENCES books(book_id) ON DELETE CASCADE,
    status      TEXT NOT NULL,   -- 'read' | 'want' | 'reading'
    created_at  TEXT NOT NULL,   -- immutable once set
    UNIQUE (user_id, book_id)
);

CREATE TABLE IF NOT EXISTS ratings (
    rating_id   TEXT PRIMARY KEY,
    book_id     TEXT NOT NULL REFERENCES books(book_id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    stars       INTEGER NOT NULL CHECK (stars BETWEEN 1 AND 5),
    created_at  TEXT NOT NULL,
    UNIQUE (book_id, user_id)
);

CREATE INDEX IF NOT EXISTS books_title_idx      ON books(title);
CREATE INDEX IF NOT EXISTS books_author_idx     ON books(author_id);
CREATE INDEX IF NOT EXISTS statuses_user_idx    ON book_statuses(user_id);
CREATE INDEX IF NOT EXISTS ratings_book_idx     ON ratings(book_id);
CREATE INDEX IF NOT EXISTS ratings_user_idx     ON ratings(user_id);

PRAGMA user_version = 1;
";
