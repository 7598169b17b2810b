//! Error types for the transfer data model and stores

use thiserror::Error;
use uuid::Uuid;

/// Storage-layer error
#[derive(Debug, Error)]
pub enum Error {
    /// Transfer does not exist
    #[error("Transfer not found: {0}")]
    TransferNotFound(Uuid),

    /// Status label does not match any known transfer status
    #[error("Unknown transfer status: {0}")]
    UnknownStatus(String),

    /// Backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
