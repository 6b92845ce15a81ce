//! gridclip-chain: the on-chain boundary.
//!
//! Three seams live here:
//!
//! - `remote` - maps a captured clip to/from its on-chain representation
//!   (one compressed baseline blob + one concatenated-and-compressed delta
//!   blob + a per-delta length table)
//! - `contract` - the opaque clip store surface (`ClipStore` trait) with an
//!   in-memory implementation
//! - `rpc` - the `LogProvider` trait and its JSON-RPC implementation, plus
//!   block-range-limited log paging

pub mod contract;
pub mod error;
pub mod remote;
pub mod rpc;

pub use contract::{ClipStore, MemoryClipStore, StoredClip};
pub use error::{Error, Result};
pub use remote::{PreparedClip, PreparedFrames, RemoteClip};
pub use rpc::{fetch_logs_paged, JsonRpcProvider, LogProvider};
