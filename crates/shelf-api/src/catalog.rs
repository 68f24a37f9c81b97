//! Handlers for `/authors` and `/genres` — the administrator-managed side of
//! the catalog. Reads are public; writes require an authenticated caller.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use shelf_core::{
  catalog::{Author, Genre, NewAuthor},
  store::CatalogStore,
};

use crate::{auth::CurrentUser, error::ApiError};

// ─── Authors ─────────────────────────────────────────────────────────────────

/// `GET /authors`
pub async fn list_authors<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Author>>, ApiError>
where
  S: CatalogStore,
{
  let authors = store
    .list_authors()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(authors))
}

/// `POST /authors` — body: [`NewAuthor`]; returns 201.
pub async fn create_author<S>(
  State(store): State<Arc<S>>,
  _user: CurrentUser,
  Json(body): Json<NewAuthor>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
{
  let author = store
    .add_author(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(author)))
}

// ─── Genres ──────────────────────────────────────────────────────────────────

/// `GET /genres`
pub async fn list_genres<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Genre>>, ApiError>
where
  S: CatalogStore,
{
  let genres = store.list_genres().await.map_err(ApiError::from_store)?;
  Ok(Json(genres))
}

#[derive(Debug, Deserialize)]
pub struct CreateGenreBody {
  pub name: String,
}

/// `POST /genres` — body: `{"name":"..."}`; 409 on a duplicate name.
pub async fn create_genre<S>(
  State(store): State<Arc<S>>,
  _user: CurrentUser,
  Json(body): Json<CreateGenreBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
{
  let genre = store
    .add_genre(body.name)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(genre)))
}
