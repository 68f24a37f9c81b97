//! Handlers for `/books` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/books` | Listing query; all filter params optional |
//! | `POST` | `/books` | Body: [`shelf_core::catalog::NewBook`]; auth required |
//! | `GET`  | `/books/{id}` | Detail view; personal overlay when authenticated |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use shelf_core::{
  catalog::{Book, BookDetail, NewBook},
  store::{BookPage, BookQuery, CatalogStore, SortKey},
};
use uuid::Uuid;

use crate::{
  auth::{CurrentUser, MaybeUser},
  error::ApiError,
};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Case-insensitive title substring.
  pub title:     Option<String>,
  /// Case-insensitive author-name substring.
  pub author:    Option<String>,
  pub genre:     Option<Uuid>,
  pub year_from: Option<i32>,
  pub year_to:   Option<i32>,
  /// `title` or `year`; anything else silently means `title`.
  pub order:     Option<String>,
  /// 1-indexed; defaults to 1.
  pub page:      Option<usize>,
}

/// `GET /books[?title=...][&author=...][&genre=...][&year_from=...]
/// [&year_to=...][&order=...][&page=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<BookPage>, ApiError>
where
  S: CatalogStore,
{
  let query = BookQuery {
    title:     params.title,
    author:    params.author,
    genre:     params.genre,
    year_from: params.year_from,
    year_to:   params.year_to,
    sort:      SortKey::parse(params.order.as_deref()),
    page:      params.page.unwrap_or(1),
  };

  let page = store
    .list_books(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page))
}

// ─── Detail ──────────────────────────────────────────────────────────────────

/// `GET /books/{id}` — 404 if not found. The `user_rating`/`has_read`
/// overlay is only populated for authenticated callers.
pub async fn detail<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  MaybeUser(viewer): MaybeUser,
) -> Result<Json<BookDetail>, ApiError>
where
  S: CatalogStore,
{
  let detail = store
    .book_detail(id, viewer.map(|u| u.user_id))
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("book {id} not found")))?;
  Ok(Json(detail))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /books` — returns 201 + the stored [`Book`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  _user: CurrentUser,
  Json(body): Json<NewBook>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
{
  let book: Book = store
    .add_book(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(book)))
}
