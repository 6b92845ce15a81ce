//! Capture state machine.
//!
//! A session moves `Idle -> Capturing -> Stopped`. The first captured
//! sample becomes the baseline; every later sample is diffed against the
//! previous captured frame (post-brightness), not against the baseline.

use crate::diff;
use crate::error::{Error, Result};
use crate::frame::FrameStore;
use crate::pixel::{self, RECORD_BRIGHTNESS};

/// Capture frame rate.
pub const CAPTURE_FPS: u32 = 5;

/// Fixed recording duration.
pub const CAPTURE_DURATION_MS: u32 = 2000;

/// Frames a full recording produces: `duration/1000 * fps`.
pub const TARGET_FRAME_COUNT: usize = (CAPTURE_DURATION_MS / 1000 * CAPTURE_FPS) as usize;

/// Capture session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Capturing,
    Stopped,
}

/// A recording session accumulating one clip.
#[derive(Debug)]
pub struct CaptureSession {
    state: CaptureState,
    store: FrameStore,
    /// Previous captured frame (grayscale, post-brightness). The diff
    /// reference, updated on every captured frame including empty deltas.
    previous: Option<Vec<u8>>,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            store: FrameStore::new(),
            previous: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Number of frames captured so far.
    pub fn frame_count(&self) -> usize {
        self.store.len()
    }

    /// Whether the session has reached the full recording length.
    pub fn is_complete(&self) -> bool {
        self.store.len() >= TARGET_FRAME_COUNT
    }

    /// The frames captured so far (for local preview/playback).
    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    /// Start (or restart) recording: clears the frame buffer and the
    /// previous-frame reference.
    pub fn begin_capture(&mut self) {
        self.store.clear();
        self.previous = None;
        self.state = CaptureState::Capturing;
    }

    /// Ingest one RGBA sample. Emits a baseline for the first frame and a
    /// delta for every later frame; the previous-frame reference advances
    /// regardless of delta size.
    pub fn capture_frame(&mut self, rgba: &[u8]) -> Result<usize> {
        if self.state != CaptureState::Capturing {
            return Err(Error::NotCapturing);
        }

        let mut gray = pixel::to_grayscale(rgba);
        pixel::adjust_brightness(&mut gray, RECORD_BRIGHTNESS);

        match self.previous {
            None => self.store.push_baseline(gray.clone()),
            Some(ref previous) => {
                let changes = pixel::diff(&gray, previous);
                self.store.push_delta(diff::serialize(&changes));
            }
        }
        self.previous = Some(gray);

        Ok(self.store.len())
    }

    /// Stop recording. Valid for both a completed recording and a manual
    /// stop partway through.
    pub fn end_capture(&mut self) {
        self.state = CaptureState::Stopped;
    }

    /// Freeze the session for saving. Fails with [`Error::EmptyCapture`]
    /// when nothing was recorded, leaving nothing to transmit.
    pub fn finish(self) -> Result<FrameStore> {
        if self.store.is_empty() {
            return Err(Error::EmptyCapture);
        }
        Ok(self.store)
    }
}
