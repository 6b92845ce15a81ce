//! Shared chain-facing types.
//!
//! [`LogEntry`] is one decoded `ClipUpdated` event. Entries are identified
//! by `(transaction_hash, log_index)` and carry last-write-wins semantics
//! per user: only a user's newest entry is meaningful for display.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A 20-byte chain address, stored as a normalized lowercase hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// The hex representation, always `0x`-prefixed lowercase.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| Error::validation(format!("address missing 0x prefix: {s}")))?;

        if hex_part.len() != 40 {
            return Err(Error::validation(format!(
                "address must be 20 bytes, got {} hex chars: {s}",
                hex_part.len()
            )));
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::validation(format!("address is not hex: {s}")));
        }

        Ok(Address(format!("0x{}", hex_part.to_ascii_lowercase())))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Farcaster user identifier attached to a clip. Opaque to gridclip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fid(pub u64);

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One decoded `ClipUpdated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Clip owner.
    pub user: Address,
    /// Farcaster id recorded with the clip.
    pub fid: Fid,
    /// Event timestamp (unix seconds, from the contract).
    pub timestamp: u64,
    /// Transaction that emitted the event.
    pub transaction_hash: String,
    /// Position of the log within the transaction receipt.
    pub log_index: u64,
    /// Block the transaction landed in.
    pub block_number: u64,
}

/// Unique identity of a log entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogKey {
    pub transaction_hash: String,
    pub log_index: u64,
}

impl LogEntry {
    /// The `(transaction_hash, log_index)` identity of this entry.
    pub fn key(&self) -> LogKey {
        LogKey {
            transaction_hash: self.transaction_hash.clone(),
            log_index: self.log_index,
        }
    }

    /// Canonical display ordering: timestamp, then block number, then log
    /// index, all descending. Duplicates sort adjacent with the canonical
    /// copy first.
    pub fn canonical_cmp(&self, other: &LogEntry) -> Ordering {
        other
            .timestamp
            .cmp(&self.timestamp)
            .then(other.block_number.cmp(&self.block_number))
            .then(other.log_index.cmp(&self.log_index))
    }
}

/// Stable-sort entries into canonical order and drop duplicate
/// `(transaction_hash, log_index)` identities, keeping the first (newest)
/// occurrence.
pub fn merge_and_dedup(mut entries: Vec<LogEntry>) -> Vec<LogEntry> {
    entries.sort_by(LogEntry::canonical_cmp);

    let mut seen = HashSet::with_capacity(entries.len());
    entries.retain(|e| seen.insert(e.key()));
    entries
}

/// Reduce canonically-ordered entries to one per user (the newest).
///
/// Input must already be in canonical order; the first entry seen for a
/// user wins.
pub fn newest_per_user(entries: &[LogEntry]) -> Vec<LogEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| seen.insert(e.user.clone()))
        .cloned()
        .collect()
}

/// A persisted cache tier document: the merged log set and the block height
/// it covers.
///
/// The covered height is string-encoded in JSON so documents survive block
/// numbers beyond 2^53.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSnapshot {
    /// Deduplicated entries in canonical order.
    pub logs: Vec<LogEntry>,
    /// Highest block this snapshot covers.
    #[serde(with = "block_string")]
    pub covered_through_block: u64,
    /// When the snapshot was captured.
    pub timestamp: DateTime<Utc>,
}

mod block_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        // Older documents stored the height as a bare number.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNumber {
            String(String),
            Number(u64),
        }

        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s.parse().map_err(de::Error::custom),
            StringOrNumber::Number(n) => Ok(n),
        }
    }
}
