use std::path::PathBuf;

use thiserror::Error;

/// Errors from cover acquisition.
#[derive(Debug, Error)]
pub enum CoverError {
    /// No API key is configured for the generation service.
    #[error("cover generation credential not set (expected in ${env})")]
    MissingCredential { env: String },

    /// Transport failure or non-success response from the service.
    #[error("cover generation service error: {0}")]
    Service(String),

    /// The service answered without any usable image.
    #[error("cover generation returned no image data")]
    NoImageData,

    /// The returned image payload could not be decoded.
    #[error("cover image payload could not be decoded: {0}")]
    Decode(String),

    /// An uploaded cover file could not be read.
    #[error("failed to read cover file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoverError {
    /// Whether this failure came from reading an upload rather than from
    /// the generation service.
    pub fn is_file_read(&self) -> bool {
        matches!(self, Self::FileRead { .. })
    }
}

pub type CoverResult<T> = Result<T, CoverError>;
