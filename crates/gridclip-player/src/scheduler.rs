//! Cooperative activity scheduling.
//!
//! Live preview, recording, and playback are mutually exclusive on the
//! same canvas and camera. The scheduler owns the one active mode token:
//! beginning a new mode invalidates the previous token, so a stale
//! activity observes its cancellation on its next tick instead of racing
//! the new one.

use std::time::{Duration, Instant};

/// The mutually-exclusive activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Preview,
    Record,
    Playback,
}

/// Proof of being the active activity. Compared by identity, not mode:
/// restarting the same mode hands out a fresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityToken {
    id: u64,
    mode: Mode,
}

impl ActivityToken {
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// Single-threaded scheduler holding the current active mode.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    active: Option<ActivityToken>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new activity, cancelling whichever one was active.
    pub fn begin(&mut self, mode: Mode) -> ActivityToken {
        self.next_id += 1;
        let token = ActivityToken {
            id: self.next_id,
            mode,
        };
        self.active = Some(token);
        token
    }

    /// Stop the current activity without starting a new one.
    pub fn stop(&mut self) {
        self.active = None;
    }

    /// Whether `token` is still the active activity.
    pub fn is_current(&self, token: ActivityToken) -> bool {
        self.active == Some(token)
    }

    pub fn active_mode(&self) -> Option<Mode> {
        self.active.map(|t| t.mode)
    }
}

/// Interval cadence for one activity.
///
/// Each step is scheduled strictly after the previous one completes, so
/// steps never overlap no matter how late a tick arrives.
#[derive(Debug)]
pub struct Cadence {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Whether a step is due at `now`. A due cadence reschedules itself
    /// relative to `now`, not to the missed deadline.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now < due => false,
            _ => {
                self.next_due = Some(now + self.interval);
                true
            }
        }
    }
}
