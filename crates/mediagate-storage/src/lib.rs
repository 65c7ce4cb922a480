//! mediagate Storage Layer
//!
//! SQLite-based persistence for attachment records and preferences.
//! Transfer-state transitions run inside transactions.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
