//! Frame pacing

use std::time::{Duration, Instant};

/// Sleeps out the rest of each frame. Overruns are not caught up.
#[derive(Debug)]
pub struct FramePacer {
    frame: Duration,
    frame_start: Instant,
    overruns: u64,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            frame: Duration::from_secs(1) / fps,
            frame_start: Instant::now(),
            overruns: 0,
        }
    }

    /// Mark the start of a frame
    pub fn begin(&mut self) {
        self.frame_start = Instant::now();
    }

    /// How long to sleep after `elapsed` of work, `None` on overrun
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.frame.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Sleep until the frame budget is used up
    pub fn finish(&mut self) {
        let elapsed = self.frame_start.elapsed();
        match self.remaining(elapsed) {
            Some(rest) => std::thread::sleep(rest),
            None => {
                self.overruns += 1;
                log::trace!("Frame overran by {:?}", elapsed - self.frame);
            }
        }
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}
