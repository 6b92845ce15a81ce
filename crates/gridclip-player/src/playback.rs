//! Per-cell clip playback.
//!
//! Each cell owns its clip's playback state and loops it forever. Codec
//! failures stop at this boundary: a failed frame renders as a visibly
//! distinct error raster and the loop keeps going, so one corrupt frame
//! never kills the mosaic.

use gridclip_chain::{PreparedClip, RemoteClip};
use gridclip_codec::reconstruct::{FrameSequence, PlaybackContext};
use gridclip_codec::{FRAME_PIXELS, FRAME_SIDE};

/// Diagonal-stripe raster shown when a frame cannot be reconstructed.
/// Distinct from both real content and blank/stale pixels.
pub fn error_frame() -> Vec<u8> {
    let mut pixels = vec![0u8; FRAME_PIXELS];
    for y in 0..FRAME_SIDE {
        for x in 0..FRAME_SIDE {
            if ((x + y) / 8) % 2 == 0 {
                pixels[y * FRAME_SIDE + x] = 255;
            }
        }
    }
    pixels
}

/// Looping sequential playback of one remote clip.
#[derive(Debug)]
pub struct ClipPlayback {
    clip: PreparedClip,
    ctx: PlaybackContext,
    cursor: usize,
}

impl ClipPlayback {
    /// Wrap a fetched clip. Decompression happens lazily on the first
    /// rendered frame.
    pub fn new(remote: RemoteClip) -> Self {
        Self {
            clip: PreparedClip::new(remote),
            ctx: PlaybackContext::new(),
            cursor: 0,
        }
    }

    /// Render the next frame and advance the loop.
    ///
    /// Never fails: reconstruction errors are reported and rendered as
    /// [`error_frame`], and the cursor still advances so later frames get
    /// their chance.
    pub fn step(&mut self) -> Vec<u8> {
        let frames = match self.clip.prepare_for_playback() {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!("Clip could not be prepared for playback: {e}");
                return error_frame();
            }
        };

        let index = self.cursor;
        self.cursor = (index + 1) % frames.frame_count();

        match self.ctx.render(frames, index) {
            Ok(pixels) => pixels,
            Err(e) => {
                tracing::warn!(frame = index, "Frame failed to reconstruct: {e}");
                error_frame()
            }
        }
    }
}
