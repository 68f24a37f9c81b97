//! JSON REST API for Shelf.
//!
//! Exposes an axum [`Router`] backed by any [`shelf_core::store::CatalogStore`].
//! TLS and transport concerns are the caller's responsibility; requests are
//! attributed to users via HTTP Basic auth verified against the stored
//! argon2 hashes.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", shelf_api::api_router(store.clone()))
//! ```

pub mod account;
pub mod auth;
pub mod books;
pub mod catalog;
pub mod error;
pub mod shelf;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use shelf_core::store::CatalogStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CatalogStore + 'static,
{
  Router::new()
    // Catalog
    .route("/books", get(books::list::<S>).post(books::create::<S>))
    .route("/books/{id}", get(books::detail::<S>))
    .route("/authors", get(catalog::list_authors::<S>).post(catalog::create_author::<S>))
    .route("/genres", get(catalog::list_genres::<S>).post(catalog::create_genre::<S>))
    // Read/rate workflow
    .route("/books/{id}/read", post(shelf::mark_as_read::<S>))
    .route("/books/{id}/status", post(shelf::set_status::<S>))
    .route("/books/{id}/rate", post(shelf::rate::<S>))
    // Accounts
    .route("/register", post(account::register::<S>))
    .route("/profile", get(account::profile::<S>))
    .with_state(store)
}
