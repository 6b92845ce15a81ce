//! Error types for gridclip-codec.

use thiserror::Error;

/// Result type for gridclip-codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for gridclip-codec operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A compressed payload could not be inflated.
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// A serialized diff buffer is not a whole number of records.
    #[error("Malformed diff buffer: {len} bytes is not a multiple of the record size")]
    MalformedDiff { len: usize },

    /// A clip was exported or reconstructed without a baseline frame.
    #[error("Clip has no baseline frame")]
    MissingBaseline,

    /// The requested frame index is not present in the sequence.
    #[error("Frame not found at index {index}")]
    FrameNotFound { index: usize },

    /// A delta frame appeared before any baseline was established.
    #[error("Delta at index {index} has no preceding baseline")]
    PrecedingBaselineMissing { index: usize },

    /// Save was attempted on a session with zero captured frames.
    #[error("Capture session produced no frames")]
    EmptyCapture,

    /// A frame was submitted while the session was not recording.
    #[error("Capture session is not recording")]
    NotCapturing,
}
