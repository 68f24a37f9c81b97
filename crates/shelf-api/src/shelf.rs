//! Handlers for the read/rate workflow.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/books/{id}/read`   | Mark as read; idempotent |
//! | `POST` | `/books/{id}/status` | Body: `{"status":"want"}` etc. |
//! | `POST` | `/books/{id}/rate`   | Body: `{"stars":4}`; gated on `read` |
//!
//! Each success response carries a `message` string for display, matching
//! the outcome (saved vs updated, shelf chosen).

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shelf_core::{
  catalog::Book,
  shelf::{Rating, ReadStatus, UserBookStatus},
  store::CatalogStore,
};
use uuid::Uuid;

use crate::{auth::CurrentUser, error::ApiError};

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatusResponse {
  pub status:  UserBookStatus,
  pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
  pub rating:  Rating,
  /// Whether this request created the rating (as opposed to updating it).
  pub created: bool,
  pub message: String,
}

fn shelved_message(book: &Book, status: ReadStatus) -> String {
  match status {
    ReadStatus::Read => format!("“{}” marked as read.", book.title),
    ReadStatus::Want => {
      format!("“{}” added to your want-to-read shelf.", book.title)
    }
    ReadStatus::Reading => {
      format!("“{}” marked as currently reading.", book.title)
    }
  }
}

async fn shelve<S>(
  store: &S,
  user_id: Uuid,
  book_id: Uuid,
  status: ReadStatus,
) -> Result<StatusResponse, ApiError>
where
  S: CatalogStore,
{
  let book = store
    .get_book(book_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("book {book_id} not found")))?;

  let stored = store
    .set_status(user_id, book_id, status)
    .await
    .map_err(ApiError::from_store)?;

  Ok(StatusResponse {
    message: shelved_message(&book, status),
    status:  stored,
  })
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `POST /books/{id}/read` — shorthand for setting the `read` status.
pub async fn mark_as_read<S>(
  State(store): State<Arc<S>>,
  Path(book_id): Path<Uuid>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<StatusResponse>, ApiError>
where
  S: CatalogStore,
{
  let response =
    shelve(store.as_ref(), user.user_id, book_id, ReadStatus::Read).await?;
  Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusBody {
  pub status: ReadStatus,
}

/// `POST /books/{id}/status` — body: `{"status":"read"|"want"|"reading"}`.
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path(book_id): Path<Uuid>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<SetStatusBody>,
) -> Result<Json<StatusResponse>, ApiError>
where
  S: CatalogStore,
{
  let response =
    shelve(store.as_ref(), user.user_id, book_id, body.status).await?;
  Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct RateBody {
  pub stars: u8,
}

/// `POST /books/{id}/rate` — body: `{"stars":1..=5}`.
///
/// 412 when the caller has not marked the book as read; 400 for stars out
/// of range. A repeat rating updates the existing row in place.
pub async fn rate<S>(
  State(store): State<Arc<S>>,
  Path(book_id): Path<Uuid>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<RateBody>,
) -> Result<Json<RateResponse>, ApiError>
where
  S: CatalogStore,
{
  let (rating, created) = store
    .rate(user.user_id, book_id, body.stars)
    .await
    .map_err(ApiError::from_store)?;

  let message = if created {
    "Thanks! Your rating has been saved.".to_owned()
  } else {
    "Your rating has been updated.".to_owned()
  };

  Ok(Json(RateResponse { rating, created, message }))
}
