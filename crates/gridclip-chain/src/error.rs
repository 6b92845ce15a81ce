//! Error types for gridclip-chain.

use thiserror::Error;

/// Result type for gridclip-chain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for gridclip-chain operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The RPC endpoint returned an error or could not be reached.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// A fetched log could not be decoded into a `ClipUpdated` entry.
    #[error("Log decode error: {0}")]
    Decode(String),

    /// The contract rejected or reverted a clip write.
    #[error("Remote write rejected: {0}")]
    WriteRejected(String),

    /// A fetched clip's blobs are inconsistent with its length table.
    #[error("Invalid remote clip: {0}")]
    InvalidRemoteClip(String),

    /// A codec failure while converting to or from the remote form.
    #[error("Codec error: {0}")]
    Codec(#[from] gridclip_codec::Error),
}

impl Error {
    /// Convenience constructor for [`Error::Rpc`].
    pub fn rpc(msg: impl Into<String>) -> Self {
        Error::Rpc(msg.into())
    }

    /// Convenience constructor for [`Error::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }
}
