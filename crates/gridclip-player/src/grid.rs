//! The mosaic grid.
//!
//! Slots are a tagged variant: either a remote clip looping through
//! playback or a synthetic noise generator. One shared clock drives the
//! whole grid; each cell tracks its own due time and renders only when
//! due, so there is a single timer no matter how many cells exist.

use std::time::{Duration, Instant};

use gridclip_chain::{ClipStore, RemoteClip};
use gridclip_core::{merge_and_dedup, newest_per_user, LogEntry};

use crate::noise::NoiseState;
use crate::playback::ClipPlayback;
use crate::scheduler::Cadence;

/// A display cell's content.
#[derive(Debug)]
pub enum GridSlot {
    /// Synthetic static.
    Noise(NoiseState),
    /// A remote clip under sequential playback.
    Clip(ClipPlayback),
}

#[derive(Debug)]
struct GridCell {
    slot: GridSlot,
    cadence: Cadence,
    frame: Option<Vec<u8>>,
}

/// A fixed-size mosaic of independently-animating cells.
#[derive(Debug)]
pub struct Grid {
    cells: Vec<GridCell>,
    frame_interval: Duration,
}

impl Grid {
    /// Create a grid of `cell_count` noise cells.
    pub fn new(cell_count: usize, frame_interval: Duration) -> Self {
        let cells = (0..cell_count)
            .map(|i| GridCell {
                slot: GridSlot::Noise(NoiseState::new(i as u64)),
                cadence: Cadence::new(frame_interval),
                frame: None,
            })
            .collect();
        Self {
            cells,
            frame_interval,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn slot(&self, index: usize) -> Option<&GridSlot> {
        self.cells.get(index).map(|c| &c.slot)
    }

    /// The cell's most recently rendered frame.
    pub fn frame(&self, index: usize) -> Option<&[u8]> {
        self.cells.get(index).and_then(|c| c.frame.as_deref())
    }

    /// Assign clips (newest first) to the leading cells; every remaining
    /// cell falls back to noise. Invalid clips are excluded, not rendered
    /// as blank content.
    pub fn populate(&mut self, clips: Vec<RemoteClip>) {
        let mut displayable = clips.into_iter().filter(RemoteClip::is_valid);

        for (i, cell) in self.cells.iter_mut().enumerate() {
            cell.slot = match displayable.next() {
                Some(clip) => GridSlot::Clip(ClipPlayback::new(clip)),
                None => GridSlot::Noise(NoiseState::new(i as u64)),
            };
            cell.cadence = Cadence::new(self.frame_interval);
            cell.frame = None;
        }
    }

    /// Rank log entries and fetch each owner's clip, newest first.
    ///
    /// Owners whose clip cannot be read are skipped so one bad fetch does
    /// not empty the grid. Returns the number of clip cells assigned.
    pub async fn populate_from_store(
        &mut self,
        entries: &[LogEntry],
        store: &dyn ClipStore,
    ) -> usize {
        let ranked = newest_per_user(&merge_and_dedup(entries.to_vec()));

        let mut clips = Vec::new();
        for entry in ranked.iter().take(self.cells.len()) {
            match store.read_clip(&entry.user).await {
                Ok(Some(stored)) => clips.push(stored.clip),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(user = %entry.user, "Skipping unreadable clip: {e}");
                }
            }
        }

        let assigned = clips.iter().filter(|c| c.is_valid()).count();
        self.populate(clips);
        assigned
    }

    /// Evaluate every cell against the shared clock, rendering the ones
    /// that are due. Returns how many cells rendered this tick.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut rendered = 0;
        for cell in &mut self.cells {
            if !cell.cadence.due(now) {
                continue;
            }
            cell.frame = Some(match &mut cell.slot {
                GridSlot::Noise(noise) => noise.next_frame(),
                GridSlot::Clip(playback) => playback.step(),
            });
            rendered += 1;
        }
        rendered
    }
}
