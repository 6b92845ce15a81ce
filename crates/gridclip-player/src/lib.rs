//! gridclip-player: the display-side engine.
//!
//! Capture, preview, and playback share one canvas and one camera, so
//! everything here is single-threaded cooperative: a [`Scheduler`] holds
//! the one active mode token, a shared tick drives every grid cell, and
//! each cell fires its own render step only when due.
//!
//! # Modules
//!
//! - `scheduler` - active-mode token and per-activity cadence
//! - `grid` - mosaic slots: remote clip playback or synthetic noise
//! - `playback` - per-cell sequential reconstruction with error rasters
//! - `noise` - seeded noise generator for unassigned cells
//! - `recorder` - cadence-driven capture with scoped camera acquisition

pub mod error;
pub mod grid;
pub mod noise;
pub mod playback;
pub mod recorder;
pub mod scheduler;

pub use error::{Error, Result};
pub use grid::{Grid, GridSlot};
pub use playback::{error_frame, ClipPlayback};
pub use recorder::{FrameSource, Recorder, RecorderStatus};
pub use scheduler::{ActivityToken, Cadence, Mode, Scheduler};
