//! Cadence-driven clip recording.
//!
//! The recorder owns its frame source for the lifetime of the recording:
//! acquisition is scoped, so dropping the recorder releases the camera on
//! every exit path, including cancellation and errors.

use std::time::{Duration, Instant};

use gridclip_codec::clip::{CaptureSession, CAPTURE_FPS};
use gridclip_codec::FrameStore;

use crate::error::{Error, Result};
use crate::scheduler::{ActivityToken, Cadence, Mode, Scheduler};

/// Source of RGBA samples; the camera stand-in. Dropping the source
/// releases the underlying device.
pub trait FrameSource: Send {
    /// Grab the current sample as an RGBA raster.
    fn grab_frame(&mut self) -> Result<Vec<u8>>;
}

/// Outcome of one recorder tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderStatus {
    /// Not due yet; nothing happened.
    Waiting,
    /// A frame was captured; recording continues.
    Capturing,
    /// The target frame count was reached; the session is stopped.
    Complete,
    /// The scheduler moved on to another activity.
    Cancelled,
}

/// A recording in progress.
#[derive(Debug)]
pub struct Recorder<S: FrameSource> {
    session: CaptureSession,
    source: S,
    cadence: Cadence,
    token: ActivityToken,
}

impl<S: FrameSource> Recorder<S> {
    /// Begin recording, taking ownership of the frame source and becoming
    /// the scheduler's active activity.
    pub fn start(scheduler: &mut Scheduler, source: S) -> Self {
        let mut session = CaptureSession::new();
        session.begin_capture();

        Self {
            session,
            source,
            cadence: Cadence::new(Duration::from_millis(1000 / CAPTURE_FPS as u64)),
            token: scheduler.begin(Mode::Record),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.session.frame_count()
    }

    /// Advance the recording by one shared-clock tick.
    pub fn tick(&mut self, scheduler: &Scheduler, now: Instant) -> Result<RecorderStatus> {
        if !scheduler.is_current(self.token) {
            return Ok(RecorderStatus::Cancelled);
        }
        if !self.cadence.due(now) {
            return Ok(RecorderStatus::Waiting);
        }

        let rgba = self.source.grab_frame()?;
        self.session.capture_frame(&rgba)?;

        if self.session.is_complete() {
            self.session.end_capture();
            return Ok(RecorderStatus::Complete);
        }
        Ok(RecorderStatus::Capturing)
    }

    /// Stop early (manual stop) and keep what was captured.
    pub fn stop(&mut self) {
        self.session.end_capture();
    }

    /// Consume the recorder, releasing the source, and freeze the clip.
    /// Fails on an empty capture.
    pub fn finish(self) -> Result<FrameStore> {
        Ok(self.session.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridclip_codec::clip::TARGET_FRAME_COUNT;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Fixed-intensity source that flags its release on drop.
    struct TestSource {
        value: u8,
        released: Arc<AtomicBool>,
    }

    impl TestSource {
        fn new(value: u8) -> (Self, Arc<AtomicBool>) {
            let released = Arc::new(AtomicBool::new(false));
            (
                Self {
                    value,
                    released: released.clone(),
                },
                released,
            )
        }
    }

    impl FrameSource for TestSource {
        fn grab_frame(&mut self) -> Result<Vec<u8>> {
            Ok(vec![self.value; 16 * 4])
        }
    }

    impl Drop for TestSource {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn run_to_completion(recorder: &mut Recorder<TestSource>, scheduler: &Scheduler) {
        let mut now = Instant::now();
        loop {
            match recorder.tick(scheduler, now).unwrap() {
                RecorderStatus::Complete => break,
                _ => now += Duration::from_millis(200),
            }
        }
    }

    #[test]
    fn records_the_target_frame_count() {
        let mut scheduler = Scheduler::new();
        let (source, _released) = TestSource::new(100);
        let mut recorder = Recorder::start(&mut scheduler, source);

        run_to_completion(&mut recorder, &scheduler);
        assert_eq!(recorder.frame_count(), TARGET_FRAME_COUNT);

        let store = recorder.finish().unwrap();
        assert_eq!(store.len(), TARGET_FRAME_COUNT);
    }

    #[test]
    fn ticks_between_deadlines_do_not_capture() {
        let mut scheduler = Scheduler::new();
        let (source, _released) = TestSource::new(100);
        let mut recorder = Recorder::start(&mut scheduler, source);

        let now = Instant::now();
        assert_eq!(recorder.tick(&scheduler, now).unwrap(), RecorderStatus::Capturing);
        assert_eq!(recorder.tick(&scheduler, now).unwrap(), RecorderStatus::Waiting);
        assert_eq!(recorder.frame_count(), 1);
    }

    #[test]
    fn starting_another_activity_cancels_recording() {
        let mut scheduler = Scheduler::new();
        let (source, _released) = TestSource::new(100);
        let mut recorder = Recorder::start(&mut scheduler, source);

        recorder.tick(&scheduler, Instant::now()).unwrap();
        scheduler.begin(Mode::Playback);

        let status = recorder
            .tick(&scheduler, Instant::now() + Duration::from_secs(1))
            .unwrap();
        assert_eq!(status, RecorderStatus::Cancelled);
    }

    #[test]
    fn source_is_released_when_recorder_drops() {
        let mut scheduler = Scheduler::new();
        let (source, released) = TestSource::new(100);
        let recorder = Recorder::start(&mut scheduler, source);

        drop(recorder);
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn source_is_released_on_finish_too() {
        let mut scheduler = Scheduler::new();
        let (source, released) = TestSource::new(100);
        let mut recorder = Recorder::start(&mut scheduler, source);

        recorder.tick(&scheduler, Instant::now()).unwrap();
        recorder.stop();
        let store = recorder.finish().unwrap();

        assert_eq!(store.len(), 1);
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn empty_recording_cannot_be_saved() {
        let mut scheduler = Scheduler::new();
        let (source, _released) = TestSource::new(100);
        let mut recorder = Recorder::start(&mut scheduler, source);

        recorder.stop();
        assert!(matches!(
            recorder.finish(),
            Err(Error::Codec(gridclip_codec::Error::EmptyCapture))
        ));
    }
}
