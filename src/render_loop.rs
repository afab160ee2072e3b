use std::time::{Duration, Instant};

use sdl2_opengl_trianglegl::Sdl2GlContext;

/// Something frames are presented to, and that decides when drawing stops.
pub trait FrameTarget {
    fn poll_should_close(&mut self) -> bool;
    fn present(&mut self);
}

impl FrameTarget for Sdl2GlContext {
    fn poll_should_close(&mut self) -> bool {
        Sdl2GlContext::poll_should_close(self)
    }

    fn present(&mut self) {
        self.swap_buffers();
    }
}

/// Keeps frames from finishing earlier than `1 / desired_fps` seconds apart.
///
/// A frame that overruns its budget is not made up for later, the next frame
/// simply starts late.
pub struct FramePacer {
    frame_duration: Duration,
    frame_started_at: Instant,
}

impl FramePacer {
    pub fn new(desired_fps: f32) -> Self {
        Self {
            frame_duration: Duration::from_secs_f32(1.0 / desired_fps),
            frame_started_at: Instant::now(),
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Sleeps off what is left of the current frame, then starts the next one.
    pub fn finish_frame(&mut self) {
        let elapsed = self.frame_started_at.elapsed();
        if let Some(remaining) = self.frame_duration.checked_sub(elapsed) {
            std::thread::sleep(remaining);
        }

        self.frame_started_at = Instant::now();
    }
}

/// Draws and presents frames until `target` asks to close.
///
/// `draw_frame` gets the fixed frame delta in seconds. Returns the number of
/// presented frames.
pub fn run_frames(
    target: &mut impl FrameTarget,
    desired_fps: f32,
    mut draw_frame: impl FnMut(f32),
) -> usize {
    let mut pacer = FramePacer::new(desired_fps);
    let delta_time_in_secs = pacer.frame_duration().as_secs_f32();
    let mut frame_count = 0;

    while !target.poll_should_close() {
        draw_frame(delta_time_in_secs);
        target.present();
        frame_count += 1;

        pacer.finish_frame();
    }

    log::debug!("Render loop stopped, frame_count = {frame_count}");

    frame_count
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    struct ClosingAfter {
        frames_left: usize,
        presented: usize,
    }

    impl ClosingAfter {
        fn new(frames: usize) -> Self {
            Self {
                frames_left: frames,
                presented: 0,
            }
        }
    }

    impl FrameTarget for ClosingAfter {
        fn poll_should_close(&mut self) -> bool {
            self.frames_left == 0
        }

        fn present(&mut self) {
            self.frames_left -= 1;
            self.presented += 1;
        }
    }

    #[test]
    fn stops_on_the_close_signal() {
        let mut target = ClosingAfter::new(3);
        let mut drawn = 0;

        let frame_count = run_frames(&mut target, 500.0, |_| drawn += 1);

        assert_eq!(3, frame_count);
        assert_eq!(3, drawn);
        assert_eq!(3, target.presented);
    }

    #[test]
    fn closed_target_draws_nothing() {
        let mut target = ClosingAfter::new(0);

        let frame_count = run_frames(&mut target, 500.0, |_| panic!("no frame expected"));

        assert_eq!(0, frame_count);
        assert_eq!(0, target.presented);
    }

    #[test]
    fn every_frame_gets_the_fixed_delta() {
        let mut target = ClosingAfter::new(2);
        let mut deltas = Vec::new();

        run_frames(&mut target, 500.0, |delta_time_in_secs| {
            deltas.push(delta_time_in_secs)
        });

        assert_eq!(2, deltas.len());
        assert!(deltas.iter().all(|delta| (delta - 0.002).abs() < 1e-6));
    }

    #[test]
    fn frames_are_not_presented_faster_than_desired() {
        let mut target = ClosingAfter::new(3);

        let start = Instant::now();
        run_frames(&mut target, 100.0, |_| ());

        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn overrunning_frame_is_not_made_up_for() {
        let mut pacer = FramePacer::new(1000.0);

        std::thread::sleep(Duration::from_millis(5));
        pacer.finish_frame();

        let start = Instant::now();
        pacer.finish_frame();

        assert!(start.elapsed() >= Duration::from_micros(900));
    }
}
