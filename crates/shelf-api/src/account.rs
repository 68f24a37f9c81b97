//! Handlers for registration and the profile view.
//!
//! Registration runs the whole validation pass before touching the store and
//! reports every failing field at once; the storage unique constraint backs
//! the username check, so a racing duplicate registration comes back as the
//! same field error rather than a 500.

use std::sync::Arc;

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rand_core::OsRng;
use serde::Deserialize;
use shelf_core::{
  account::{NewUser, User},
  password,
  shelf::{ProfileView, ReadStatus},
  store::CatalogStore,
};

use crate::{
  auth::CurrentUser,
  error::{ApiError, FieldErrors},
};

// ─── Register ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username:         String,
  pub first_name:       String,
  pub last_name:        String,
  pub password:         String,
  pub password_confirm: String,
  pub birth_year:       Option<i32>,
  pub city:             Option<String>,
}

fn valid_username_char(c: char) -> bool {
  c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

/// Field-level validation; returns an empty map when everything passes.
fn validate(body: &RegisterBody) -> FieldErrors {
  let mut errors = FieldErrors::new();
  let mut fail = |field: &str, message: String| {
    errors.entry(field.to_owned()).or_default().push(message);
  };

  if body.username.is_empty() {
    fail("username", "username is required".into());
  } else if !body.username.chars().all(valid_username_char) {
    fail(
      "username",
      "only letters, digits and @/./+/-/_ are allowed".into(),
    );
  }

  if body.first_name.is_empty() {
    fail("first_name", "this field is required".into());
  }
  if body.last_name.is_empty() {
    fail("last_name", "this field is required".into());
  }

  for rule in password::validate(&body.password) {
    fail("password", rule.to_string());
  }
  if body.password != body.password_confirm {
    fail("password_confirm", "passwords do not match".into());
  }

  errors
}

/// `POST /register` — returns 201 + the created user, or 422 with a
/// field-keyed error map.
pub async fn register<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore,
{
  let mut errors = validate(&body);

  // Uniqueness pre-check; the constraint catches the race below.
  if !errors.contains_key("username")
    && store
      .get_user_by_username(&body.username)
      .await
      .map_err(ApiError::from_store)?
      .is_some()
  {
    errors
      .entry("username".to_owned())
      .or_default()
      .push("username is already taken".to_owned());
  }

  if !errors.is_empty() {
    return Err(ApiError::Validation(errors));
  }

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(body.password.as_bytes(), &salt)
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))?
    .to_string();

  let result = store
    .create_user(NewUser {
      username: body.username,
      first_name: body.first_name,
      last_name: body.last_name,
      password_hash,
      birth_year: body.birth_year,
      city: body.city,
    })
    .await;

  let user: User = match result {
    Ok(user) => user,
    // Lost the race against a concurrent registration of the same name.
    Err(e) => match e.into() {
      shelf_core::Error::UsernameTaken(_) => {
        let mut errors = FieldErrors::new();
        errors.insert(
          "username".to_owned(),
          vec!["username is already taken".to_owned()],
        );
        return Err(ApiError::Validation(errors));
      }
      other => return Err(ApiError::from(other)),
    },
  };

  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ProfileParams {
  /// `read` (default), `want` or `reading`.
  pub status: Option<String>,
}

/// `GET /profile[?status=...]`
pub async fn profile<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user): CurrentUser,
  Query(params): Query<ProfileParams>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: CatalogStore,
{
  let filter = match params.status.as_deref() {
    None => ReadStatus::Read,
    Some(s) => ReadStatus::parse(s)
      .ok_or_else(|| ApiError::BadRequest(format!("unknown status: {s:?}")))?,
  };

  let view = store
    .profile_view(user.user_id, filter)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(view))
}
