//! Synthetic noise for unassigned grid cells.

use gridclip_codec::FRAME_PIXELS;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded noise generator. One per noise cell so cells animate
/// independently but reproducibly.
#[derive(Debug)]
pub struct NoiseState {
    rng: StdRng,
}

impl NoiseState {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produce one frame of full-range static.
    pub fn next_frame(&mut self) -> Vec<u8> {
        (0..FRAME_PIXELS).map(|_| self.rng.gen()).collect()
    }
}
