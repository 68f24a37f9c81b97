//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every domain error is recovered here and translated into an HTTP status
//! plus a user-facing message; nothing propagates as an unhandled fault and
//! nothing is retried.

use std::collections::BTreeMap;

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Field-keyed validation messages, as produced by the registration
/// workflow. Ordered so responses are stable.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The read-before-rate gate failed.
  #[error("precondition failed: {0}")]
  PreconditionFailed(String),

  /// A uniqueness conflict outside a form context (e.g. duplicate isbn).
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("validation failed")]
  Validation(FieldErrors),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Flatten a store error into the domain error and map it to a response.
  pub fn from_store<E: Into<shelf_core::Error>>(err: E) -> Self {
    Self::from(err.into())
  }
}

impl From<shelf_core::Error> for ApiError {
  fn from(err: shelf_core::Error) -> Self {
    use shelf_core::Error as E;
    match &err {
      E::BookNotFound(_)
      | E::AuthorNotFound(_)
      | E::GenreNotFound(_)
      | E::UserNotFound(_) => ApiError::NotFound(err.to_string()),
      E::NotMarkedRead { .. } => ApiError::PreconditionFailed(
        "mark the book as read before rating it".into(),
      ),
      E::InvalidStars(_) | E::UnknownStatus(_) => {
        ApiError::BadRequest(err.to_string())
      }
      E::UsernameTaken(_) | E::DuplicateIsbn(_) | E::DuplicateGenre(_) => {
        ApiError::Conflict(err.to_string())
      }
      E::Storage(_) => ApiError::Internal(err.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"shelf\""),
        );
        res
      }
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::PreconditionFailed(m) => {
        (StatusCode::PRECONDITION_FAILED, Json(json!({ "error": m })))
          .into_response()
      }
      ApiError::Conflict(m) => {
        (StatusCode::CONFLICT, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Validation(fields) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "errors": fields })),
      )
        .into_response(),
      ApiError::Internal(m) => {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": m })))
          .into_response()
      }
    }
  }
}
