//! Transfer error types

use thiserror::Error;

use crate::attachment::AttachmentId;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Attachment not found: {0}")]
    NotFound(AttachmentId),

    #[error("Storage error: {0}")]
    Storage(#[from] mediagate_storage::StorageError),

    #[error("Invalid transfer state: {0}")]
    InvalidState(String),

    #[error("Invalid stored timestamp: {0}")]
    InvalidTimestamp(String),
}

