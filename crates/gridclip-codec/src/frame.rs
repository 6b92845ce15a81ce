//! In-memory frame storage for a capture session.
//!
//! Every frame is kept in two forms: the raw serialized payload (the full
//! raster for a baseline, the packed diff records for a delta) and that
//! payload independently deflated. Local playback inflates the per-frame
//! compressed bytes; the remote adapter concatenates the raw delta bytes
//! and compresses them once.

use crate::compress;

/// Discriminates baseline and delta frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Full raster reference frame.
    Baseline,
    /// Sparse changed-pixel records relative to the previous frame.
    Delta,
}

/// One captured frame with both payload forms.
#[derive(Debug, Clone)]
pub struct StoredFrame {
    pub kind: FrameKind,
    /// Serialized payload before compression.
    pub raw: Vec<u8>,
    /// `raw` deflated on its own.
    pub compressed: Vec<u8>,
}

/// Ordered sequence of captured frames: one baseline, then deltas.
#[derive(Debug, Clone, Default)]
pub struct FrameStore {
    frames: Vec<StoredFrame>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the baseline raster.
    pub fn push_baseline(&mut self, pixels: Vec<u8>) {
        let compressed = compress::compress(&pixels);
        self.frames.push(StoredFrame {
            kind: FrameKind::Baseline,
            raw: pixels,
            compressed,
        });
    }

    /// Append a serialized delta payload. Zero-length payloads are valid:
    /// a frame with no changes still occupies a slot to preserve timing.
    pub fn push_delta(&mut self, serialized: Vec<u8>) {
        let compressed = compress::compress(&serialized);
        self.frames.push(StoredFrame {
            kind: FrameKind::Delta,
            raw: serialized,
            compressed,
        });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StoredFrame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> impl Iterator<Item = &StoredFrame> {
        self.frames.iter()
    }

    /// The clip's baseline frame, if one was captured.
    pub fn baseline(&self) -> Option<&StoredFrame> {
        self.frames.iter().find(|f| f.kind == FrameKind::Baseline)
    }

    /// Delta frames in capture order.
    pub fn deltas(&self) -> impl Iterator<Item = &StoredFrame> {
        self.frames.iter().filter(|f| f.kind == FrameKind::Delta)
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::decompress;

    #[test]
    fn stores_both_payload_forms() {
        let mut store = FrameStore::new();
        store.push_baseline(vec![9u8; 64]);
        store.push_delta(vec![1, 0, 200]);

        let baseline = store.get(0).unwrap();
        assert_eq!(baseline.kind, FrameKind::Baseline);
        assert_eq!(baseline.raw, vec![9u8; 64]);
        assert_eq!(decompress(&baseline.compressed).unwrap(), baseline.raw);

        let delta = store.get(1).unwrap();
        assert_eq!(delta.kind, FrameKind::Delta);
        assert_eq!(delta.raw, vec![1, 0, 200]);
        assert_eq!(decompress(&delta.compressed).unwrap(), delta.raw);
    }

    #[test]
    fn zero_length_delta_occupies_a_slot() {
        let mut store = FrameStore::new();
        store.push_baseline(vec![0u8; 64]);
        store.push_delta(Vec::new());
        store.push_delta(vec![2, 0, 50]);

        assert_eq!(store.len(), 3);
        assert!(store.get(1).unwrap().raw.is_empty());
        assert_eq!(store.deltas().count(), 2);
    }

    #[test]
    fn baseline_lookup() {
        let mut store = FrameStore::new();
        assert!(store.baseline().is_none());
        store.push_baseline(vec![1u8; 4]);
        assert!(store.baseline().is_some());
    }
}
