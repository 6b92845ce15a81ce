//! Remote clip form and lazy playback preparation.
//!
//! On chain a clip is stored as one compressed baseline blob plus a single
//! blob holding every delta's raw bytes concatenated in capture order and
//! compressed once. A parallel length table records each delta's
//! pre-compression size so individual deltas can be sliced back out of the
//! decompressed blob by prefix-summing lengths.

use std::borrow::Cow;

use gridclip_codec::compress;
use gridclip_codec::frame::{FrameKind, FrameStore};
use gridclip_codec::reconstruct::FrameSequence;
use gridclip_codec::Error as CodecError;
use gridclip_core::Fid;

use crate::error::{Error, Result};

/// A clip in its on-chain representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteClip {
    /// The baseline raster, deflated on its own.
    pub first_frame: Vec<u8>,
    /// All delta payloads concatenated then deflated once.
    pub compressed_diffs: Vec<u8>,
    /// Pre-compression byte length of each delta, in capture order.
    pub diff_lengths: Vec<u32>,
    /// Farcaster id recorded with the clip.
    pub fid: Fid,
}

impl RemoteClip {
    /// Build the remote form from a finished capture.
    ///
    /// The baseline's per-frame compressed bytes are reused as
    /// `first_frame`; delta payloads are concatenated raw and compressed
    /// once. Fails with a missing-baseline error when the store holds no
    /// baseline frame.
    pub fn from_store(store: &FrameStore, fid: Fid) -> Result<Self> {
        let baseline = store.baseline().ok_or(CodecError::MissingBaseline)?;

        let mut concatenated = Vec::new();
        let mut diff_lengths = Vec::new();
        for delta in store.deltas() {
            diff_lengths.push(delta.raw.len() as u32);
            concatenated.extend_from_slice(&delta.raw);
        }

        Ok(RemoteClip {
            first_frame: baseline.compressed.clone(),
            compressed_diffs: compress::compress(&concatenated),
            diff_lengths,
            fid,
        })
    }

    /// Whether this clip is displayable. A clip with an empty or all-zero
    /// baseline blob is treated as absent, not as a zero-content clip.
    pub fn is_valid(&self) -> bool {
        !self.first_frame.is_empty() && self.first_frame.iter().any(|b| *b != 0)
    }

    /// Total frame count (baseline + deltas).
    pub fn frame_count(&self) -> usize {
        1 + self.diff_lengths.len()
    }
}

/// A remote clip with lazily-decompressed playback state.
#[derive(Debug)]
pub struct PreparedClip {
    remote: RemoteClip,
    prepared: Option<PreparedFrames>,
}

/// Decompressed frame data ready for reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedFrames {
    baseline: Vec<u8>,
    diffs: Vec<u8>,
    /// Prefix sums of `diff_lengths`: delta i spans
    /// `offsets[i]..offsets[i + 1]` in `diffs`.
    offsets: Vec<usize>,
}

impl PreparedClip {
    /// Wrap a fetched clip without decompressing anything yet.
    pub fn new(remote: RemoteClip) -> Self {
        Self {
            remote,
            prepared: None,
        }
    }

    pub fn remote(&self) -> &RemoteClip {
        &self.remote
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    /// Decompress the baseline and the delta blob. Idempotent: repeated
    /// calls after a success are no-ops returning the same state.
    pub fn prepare_for_playback(&mut self) -> Result<&PreparedFrames> {
        if self.prepared.is_none() {
            let baseline = compress::decompress(&self.remote.first_frame)?;
            let diffs = compress::decompress(&self.remote.compressed_diffs)?;

            let mut offsets = Vec::with_capacity(self.remote.diff_lengths.len() + 1);
            let mut end = 0usize;
            offsets.push(0);
            for len in &self.remote.diff_lengths {
                end += *len as usize;
                offsets.push(end);
            }
            if end != diffs.len() {
                return Err(Error::InvalidRemoteClip(format!(
                    "length table sums to {end} bytes but diff blob holds {}",
                    diffs.len()
                )));
            }

            self.prepared = Some(PreparedFrames {
                baseline,
                diffs,
                offsets,
            });
        }

        Ok(self.prepared.as_ref().expect("just prepared"))
    }
}

impl FrameSequence for PreparedFrames {
    fn frame_count(&self) -> usize {
        self.offsets.len()
    }

    fn kind(&self, index: usize) -> gridclip_codec::Result<FrameKind> {
        if index >= self.frame_count() {
            return Err(CodecError::FrameNotFound { index });
        }
        Ok(if index == 0 {
            FrameKind::Baseline
        } else {
            FrameKind::Delta
        })
    }

    fn payload(&self, index: usize) -> gridclip_codec::Result<Cow<'_, [u8]>> {
        if index == 0 {
            return Ok(Cow::Borrowed(&self.baseline));
        }
        let delta = index - 1;
        if delta + 1 >= self.offsets.len() {
            return Err(CodecError::FrameNotFound { index });
        }
        Ok(Cow::Borrowed(
            &self.diffs[self.offsets[delta]..self.offsets[delta + 1]],
        ))
    }
}
