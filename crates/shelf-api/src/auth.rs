//! HTTP Basic-auth extractors backed by the user table.
//!
//! [`CurrentUser`] rejects with 401 when credentials are missing or wrong;
//! [`MaybeUser`] resolves to `None` when no credentials are supplied at all,
//! which is how the detail view serves anonymous callers.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use shelf_core::{account::User, store::CatalogStore};

use crate::error::ApiError;

/// The authenticated caller. Extraction fails with 401 unless the request
/// carries valid Basic credentials for an existing user.
pub struct CurrentUser(pub User);

/// Like [`CurrentUser`], but a missing Authorization header is `None`
/// instead of a rejection. Credentials that are present but wrong still
/// reject — a typo should not silently demote the caller to anonymous.
pub struct MaybeUser(pub Option<User>);

/// Resolve and verify Basic credentials against the store.
async fn verify_credentials<S>(
  headers: &HeaderMap,
  store: &S,
) -> Result<User, ApiError>
where
  S: CatalogStore,
{
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds =
    std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let user = store
    .get_user_by_username(username)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&user.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(user)
}

impl<S> FromRequestParts<Arc<S>> for CurrentUser
where
  S: CatalogStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &Arc<S>,
  ) -> Result<Self, Self::Rejection> {
    let user = verify_credentials(&parts.headers, state.as_ref()).await?;
    Ok(CurrentUser(user))
  }
}

impl<S> FromRequestParts<Arc<S>> for MaybeUser
where
  S: CatalogStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &Arc<S>,
  ) -> Result<Self, Self::Rejection> {
    if !parts.headers.contains_key(axum::http::header::AUTHORIZATION) {
      return Ok(MaybeUser(None));
    }
    let user = verify_credentials(&parts.headers, state.as_ref()).await?;
    Ok(MaybeUser(Some(user)))
  }
}
