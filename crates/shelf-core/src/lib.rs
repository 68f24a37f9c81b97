//! Domain types and the storage trait for the Shelf library catalog.
//!
//! No HTTP, no database: every other crate in the workspace depends on this
//! one, and this one depends only on serde, chrono, uuid and thiserror.

pub mod account;
pub mod catalog;
pub mod error;
pub mod password;
pub mod shelf;
pub mod store;

pub use error::{Error, Result};
