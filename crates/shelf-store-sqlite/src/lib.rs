//! SQLite implementation of [`shelf_core::store::CatalogStore`].
//!
//! Database work goes through [`tokio_rusqlite`], which keeps the rusqlite
//! connection on its own thread so handlers never block the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
