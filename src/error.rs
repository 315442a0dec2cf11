//! Error types for the request and file surfaces.
//!
//! Table conversion itself cannot fail; only reading inputs and decoding or
//! encoding skill payloads can.

use std::io;

use thiserror::Error;

/// Result type alias for `mdtablejson` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The request body is not a valid skill request.
    #[error("invalid skill request: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    /// The response could not be encoded.
    #[error("failed to encode skill response: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl Error {
    /// Short machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) | Self::Serialize(_) => "internal_error",
            Self::InvalidRequest(_) => "bad_request",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Io(_) | Self::Serialize(_) => 500,
            Self::InvalidRequest(_) => 400,
        }
    }
}
