//! User accounts and profiles.
//!
//! A profile row exists for every user, created in the same transaction as
//! the user itself — registration either produces both or neither.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
  /// Argon2 PHC string. Never serialised into API responses.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
}

/// Optional demographic details, one-to-one with the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:    Uuid,
  pub birth_year: Option<i32>,
  pub city:       Option<String>,
}

/// Input for the registration transaction: the user row plus its profile
/// fields. The password arrives already hashed — the policy check and the
/// hashing both happen at the API boundary.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub first_name:    String,
  pub last_name:     String,
  pub password_hash: String,
  pub birth_year:    Option<i32>,
  pub city:          Option<String>,
}
