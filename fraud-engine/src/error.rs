//! Error types for the screening engine

use thiserror::Error;
use uuid::Uuid;

/// Screening engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Transfer does not exist
    #[error("Transfer not found: {0}")]
    NotFound(Uuid),

    /// Status label does not match any known transfer status
    #[error("Unknown transfer status: {0}")]
    UnknownStatus(String),

    /// Collaborator failure surfaced by a store
    #[error(transparent)]
    Store(#[from] transfer_core::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
