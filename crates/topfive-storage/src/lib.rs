//! TopFive Storage Layer
//!
//! SQLite-based persistence for durable client state. The only durable state
//! the client keeps is a set of named flags with an expiry, most notably the
//! remembered-login flag read at startup.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
