use std::time::{Duration, Instant};

/// Paces the tick loop to a fixed rate and reports the time between ticks.
pub struct FrameTimer {
    last_frame: Instant,
    frame_duration: Option<Duration>,
}

impl FrameTimer {
    /// A `tick_rate` of zero runs unpaced.
    pub fn new(tick_rate: u32) -> Self {
        Self {
            last_frame: Instant::now(),
            frame_duration: (tick_rate > 0).then(|| Duration::from_secs_f64(1.0 / tick_rate as f64)),
        }
    }

    /// Sleeps for the rest of the current frame and returns the time since the previous call.
    pub fn get_dt(&mut self) -> Duration {
        if let Some(frame_duration) = self.frame_duration {
            let elapsed = self.last_frame.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame);

        self.last_frame = now;

        dt
    }
}
