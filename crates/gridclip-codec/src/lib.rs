//! gridclip-codec: grayscale clip capture and reconstruction.
//!
//! This crate implements the differential frame codec: a clip is one full
//! baseline raster followed by sparse delta frames, each delta listing only
//! the pixels that moved more than the threshold since the previous frame.
//!
//! # Modules
//!
//! - `pixel` - grayscale conversion, brightness, per-pixel diff extraction
//! - `diff` - 3-byte `(index, value)` record packing for delta frames
//! - `compress` - DEFLATE (zlib) byte-stream helpers
//! - `frame` - in-memory frame store (raw + per-frame compressed payloads)
//! - `clip` - capture state machine (`Idle -> Capturing -> Stopped`)
//! - `reconstruct` - sequential playback and random-access preview
//!
//! # Architecture
//!
//! Capture grayscales and brightens each sample, then diffs it against the
//! previous captured frame; the first sample becomes the baseline. Every
//! frame's serialized payload is kept twice: raw (feeds the remote
//! concatenate-then-compress blob) and independently compressed (feeds
//! local playback). Reconstruction is state-dependent: deltas apply
//! cumulatively on top of the previous reconstructed frame, so sequential
//! playback owns a [`reconstruct::PlaybackContext`] while random-access
//! preview walks the sequence on its own local accumulator.

pub mod clip;
pub mod compress;
pub mod diff;
pub mod error;
pub mod frame;
pub mod pixel;
pub mod reconstruct;

pub use clip::{CaptureSession, CaptureState};
pub use error::{Error, Result};
pub use frame::{FrameKind, FrameStore, StoredFrame};
pub use pixel::{PixelChange, DIFF_THRESHOLD, FRAME_PIXELS, FRAME_SIDE};
pub use reconstruct::{frame_at, FrameSequence, PlaybackContext};
