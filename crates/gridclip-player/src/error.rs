//! Error types for gridclip-player.

use thiserror::Error;

/// Result type for gridclip-player operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for gridclip-player operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The frame source (camera stand-in) failed to deliver a sample.
    #[error("Frame source error: {0}")]
    Source(String),

    /// A codec failure on the capture path.
    #[error("Codec error: {0}")]
    Codec(#[from] gridclip_codec::Error),
}

impl Error {
    /// Convenience constructor for [`Error::Source`].
    pub fn source(msg: impl Into<String>) -> Self {
        Error::Source(msg.into())
    }
}
