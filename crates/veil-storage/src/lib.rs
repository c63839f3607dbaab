//! Veil Storage Layer
//!
//! Browsing state is kept as named JSON documents that are read and
//! rewritten as a whole on every update. Two backends are provided:
//! plain `.json` files in the data directory and a single SQLite file.

mod database;
mod error;
mod json_file;
mod migrations;
mod store;

pub use database::SqliteStore;
pub use error::StorageError;
pub use json_file::JsonFileStore;
pub use store::{load_json, save_json, DocumentStore, MemoryStore};

pub type Result<T> = std::result::Result<T, StorageError>;
