//! Browsing state error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Storage error: {0}")]
    Storage(#[from] veil_storage::StorageError),

    #[error("Invalid date partition: {0}")]
    InvalidDate(String),
}
