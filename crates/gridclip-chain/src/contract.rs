//! Opaque clip store surface.
//!
//! The contract is an external key-value collaborator keyed by owner
//! address: a write replaces the owner's previous clip (last-write-wins,
//! no versioning) and emits a `ClipUpdated(owner, fid, timestamp)` event.
//! Write failures surface the provider's message and are never retried
//! automatically.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use gridclip_core::{Address, LogEntry};

use crate::error::Result;
use crate::remote::RemoteClip;

/// A clip as read back from the store, with the write timestamp the
/// contract recorded.
#[derive(Debug, Clone)]
pub struct StoredClip {
    pub clip: RemoteClip,
    pub timestamp: u64,
}

/// The contract surface. One clip per owner.
#[async_trait]
pub trait ClipStore: Send + Sync {
    /// Replace the owner's clip.
    async fn write_clip(&self, owner: &Address, clip: &RemoteClip) -> Result<()>;

    /// Fetch the owner's current clip, if any.
    async fn read_clip(&self, owner: &Address) -> Result<Option<StoredClip>>;
}

/// In-memory [`ClipStore`] used by tests and offline demos. Timestamps are
/// a monotonic counter standing in for block time; emitted `ClipUpdated`
/// entries are kept for inspection.
#[derive(Debug, Default)]
pub struct MemoryClipStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    clips: HashMap<Address, StoredClip>,
    events: Vec<LogEntry>,
    next_timestamp: u64,
}

impl MemoryClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `ClipUpdated` entry emitted so far, in write order.
    pub fn events(&self) -> Vec<LogEntry> {
        self.inner.read().events.clone()
    }
}

#[async_trait]
impl ClipStore for MemoryClipStore {
    async fn write_clip(&self, owner: &Address, clip: &RemoteClip) -> Result<()> {
        let mut inner = self.inner.write();
        inner.next_timestamp += 1;
        let timestamp = inner.next_timestamp;

        inner.clips.insert(
            owner.clone(),
            StoredClip {
                clip: clip.clone(),
                timestamp,
            },
        );

        let log_index = inner.events.len() as u64;
        inner.events.push(LogEntry {
            user: owner.clone(),
            fid: clip.fid,
            timestamp,
            transaction_hash: format!("0x{log_index:064x}"),
            log_index,
            block_number: timestamp,
        });

        Ok(())
    }

    async fn read_clip(&self, owner: &Address) -> Result<Option<StoredClip>> {
        Ok(self.inner.read().clips.get(owner).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridclip_codec::FrameStore;
    use gridclip_core::Fid;

    fn remote(value: u8) -> RemoteClip {
        let mut store = FrameStore::new();
        store.push_baseline(vec![value; 64]);
        RemoteClip::from_store(&store, Fid(9)).unwrap()
    }

    fn owner() -> Address {
        "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".parse().unwrap()
    }

    #[tokio::test]
    async fn read_back_what_was_written() {
        let store = MemoryClipStore::new();
        store.write_clip(&owner(), &remote(1)).await.unwrap();

        let stored = store.read_clip(&owner()).await.unwrap().unwrap();
        assert_eq!(stored.clip, remote(1));
    }

    #[tokio::test]
    async fn missing_owner_reads_none() {
        let store = MemoryClipStore::new();
        assert!(store.read_clip(&owner()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_write_replaces_the_first() {
        let store = MemoryClipStore::new();
        store.write_clip(&owner(), &remote(1)).await.unwrap();
        store.write_clip(&owner(), &remote(2)).await.unwrap();

        let stored = store.read_clip(&owner()).await.unwrap().unwrap();
        assert_eq!(stored.clip, remote(2));

        // Both writes emitted events; the store keeps one clip.
        assert_eq!(store.events().len(), 2);
    }

    #[tokio::test]
    async fn events_carry_increasing_timestamps() {
        let store = MemoryClipStore::new();
        store.write_clip(&owner(), &remote(1)).await.unwrap();
        store.write_clip(&owner(), &remote(2)).await.unwrap();

        let events = store.events();
        assert!(events[1].timestamp > events[0].timestamp);
        assert_eq!(events[0].fid, Fid(9));
    }
}
