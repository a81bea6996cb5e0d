use std::path::PathBuf;

use thiserror::Error;
use vlib_cover::CoverError;
use vlib_store::{ImportError, StorageError, StoreError};
use vlib_types::{BookId, BookPosition, BookcaseId, TypeError};

use crate::config::ConfigError;

/// Every failure a library operation can report.
///
/// None of these are fatal: the operation is abandoned, state is left as it
/// was, and the front end shows a notification.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("all bookcases are full; add a new bookcase first")]
    AllocationExhausted,

    #[error("cover generation failed: {0}")]
    CoverGeneration(#[source] CoverError),

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid library file: {0}")]
    ImportFormat(#[from] ImportError),

    #[error("slot {position} is already taken by {occupant}")]
    SlotOccupied {
        position: BookPosition,
        occupant: BookId,
    },

    #[error("unknown bookcase: {0}")]
    UnknownBookcase(BookcaseId),

    #[error("position {0} is outside its bookcase")]
    PositionOutOfRange(BookPosition),

    #[error("invalid book: {0}")]
    InvalidDraft(#[from] TypeError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The persisted record exists but does not decode.
    #[error("stored library is unreadable: {0}")]
    Persisted(#[source] ImportError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for LibraryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AllocationExhausted => Self::AllocationExhausted,
            StoreError::SlotOccupied { position, occupant } => {
                Self::SlotOccupied { position, occupant }
            }
            StoreError::UnknownBookcase(id) => Self::UnknownBookcase(id),
            StoreError::PositionOutOfRange(position) => Self::PositionOutOfRange(position),
            StoreError::InvalidDraft(e) => Self::InvalidDraft(e),
        }
    }
}

impl From<CoverError> for LibraryError {
    fn from(e: CoverError) -> Self {
        match e {
            CoverError::FileRead { path, source } => Self::FileRead { path, source },
            other => Self::CoverGeneration(other),
        }
    }
}

pub type LibraryResult<T> = Result<T, LibraryError>;
