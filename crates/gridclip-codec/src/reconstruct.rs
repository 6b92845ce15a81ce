//! Frame reconstruction: sequential playback and random-access preview.
//!
//! Deltas are cumulative relative to the previous reconstructed frame, so
//! reconstruction is state-dependent. Sequential playback threads its
//! state through an explicit [`PlaybackContext`] owned by the playback
//! loop; random-access preview ([`frame_at`]) walks the sequence on a
//! local accumulator and never touches playback state, so the two modes
//! compose without interference.

use std::borrow::Cow;

use crate::compress;
use crate::diff;
use crate::error::{Error, Result};
use crate::frame::{FrameKind, FrameStore};
use crate::pixel::PixelChange;

/// A decodable sequence of frames.
///
/// `payload` yields the raw serialized bytes of a frame: the full raster
/// for a baseline, packed diff records for a delta. [`FrameStore`]
/// inflates its per-frame compressed bytes; a remotely-fetched clip slices
/// its decompressed concatenated blob.
pub trait FrameSequence {
    fn frame_count(&self) -> usize;

    /// The kind of the frame at `index`.
    fn kind(&self, index: usize) -> Result<FrameKind>;

    /// The raw serialized payload of the frame at `index`.
    fn payload(&self, index: usize) -> Result<Cow<'_, [u8]>>;
}

impl FrameSequence for FrameStore {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn kind(&self, index: usize) -> Result<FrameKind> {
        self.get(index)
            .map(|f| f.kind)
            .ok_or(Error::FrameNotFound { index })
    }

    fn payload(&self, index: usize) -> Result<Cow<'_, [u8]>> {
        let frame = self.get(index).ok_or(Error::FrameNotFound { index })?;
        compress::decompress(&frame.compressed).map(Cow::Owned)
    }
}

/// Apply delta records on top of a raster. Out-of-range indices are
/// ignored rather than panicking on corrupt input.
fn apply_changes(pixels: &mut [u8], changes: &[PixelChange]) {
    for change in changes {
        if let Some(px) = pixels.get_mut(change.index as usize) {
            *px = change.value;
        }
    }
}

/// Mutable state for sequential playback of one clip.
///
/// One context per playback loop; never share it with preview calls.
#[derive(Debug, Default)]
pub struct PlaybackContext {
    current: Option<Vec<u8>>,
}

impl PlaybackContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the carried frame so the next baseline decode starts fresh.
    /// Called implicitly when a baseline frame is rendered.
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Reconstruct the frame at `index`, advancing the carried state.
    ///
    /// A baseline resets the context before decoding, so a loop wrapping
    /// back to frame 0 always gets a fresh decode rather than a stale
    /// carry-over. A delta applies onto a copy of the carried frame; the
    /// previously returned raster is never mutated.
    pub fn render(&mut self, seq: &impl FrameSequence, index: usize) -> Result<Vec<u8>> {
        match seq.kind(index)? {
            FrameKind::Baseline => {
                self.reset();
                let pixels = seq.payload(index)?.into_owned();
                self.current = Some(pixels.clone());
                Ok(pixels)
            }
            FrameKind::Delta => {
                let previous = self
                    .current
                    .as_ref()
                    .ok_or(Error::PrecedingBaselineMissing { index })?;
                let changes = diff::deserialize(&seq.payload(index)?)?;

                let mut next = previous.clone();
                apply_changes(&mut next, &changes);
                self.current = Some(next.clone());
                Ok(next)
            }
        }
    }
}

/// Reconstruct a single frame without touching any playback state.
///
/// Walks the sequence from the baseline up to and including `index` on a
/// local accumulator.
pub fn frame_at(seq: &impl FrameSequence, index: usize) -> Result<Vec<u8>> {
    if index >= seq.frame_count() {
        return Err(Error::FrameNotFound { index });
    }

    let mut accumulator: Option<Vec<u8>> = None;
    for i in 0..=index {
        match seq.kind(i)? {
            FrameKind::Baseline => {
                accumulator = Some(seq.payload(i)?.into_owned());
            }
            FrameKind::Delta => {
                let pixels = accumulator
                    .as_mut()
                    .ok_or(Error::PrecedingBaselineMissing { index: i })?;
                let changes = diff::deserialize(&seq.payload(i)?)?;
                apply_changes(pixels, &changes);
            }
        }
    }

    accumulator.ok_or(Error::FrameNotFound { index })
}
