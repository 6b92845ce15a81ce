//! gridclip-core: shared types and the unified application error.
//!
//! Everything that crosses crate boundaries lives here: chain addresses,
//! decoded `ClipUpdated` log entries, persisted cache snapshots, and the
//! canonical ordering/dedup rules the caching layer depends on.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{merge_and_dedup, newest_per_user, Address, Fid, LogEntry, LogKey, LogSnapshot};
