// src/frame_timer.rs

use std::collections::VecDeque;

const SAMPLE_COUNT: usize = 120;

/// Rolling frame-rate estimate over the last 120 frames.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    deltas: VecDeque<f32>,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            deltas: VecDeque::with_capacity(SAMPLE_COUNT),
        }
    }

    pub fn record(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        if self.deltas.len() == SAMPLE_COUNT {
            self.deltas.pop_front();
        }
        self.deltas.push_back(dt);
    }

    /// Frames per second over the current window.
    pub fn framerate(&self) -> f32 {
        let total: f32 = self.deltas.iter().sum();
        if self.deltas.is_empty() || total <= 0.0 {
            return 0.0;
        }
        self.deltas.len() as f32 / total
    }

    pub fn ms_per_frame(&self) -> f32 {
        let fps = self.framerate();
        if fps > 0.0 {
            1000.0 / fps
        } else {
            0.0
        }
    }

    /// `"{prefix} - {ms} ms/frame {fps}"`, both values rounded to integers.
    pub fn title(&self, prefix: &str) -> String {
        format!(
            "{} - {} ms/frame {}",
            prefix,
            self.ms_per_frame().round() as i64,
            self.framerate().round() as i64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_timer_reports_zero() {
        let timer = FrameTimer::new();
        assert_eq!(timer.framerate(), 0.0);
        assert_eq!(timer.ms_per_frame(), 0.0);
        assert_eq!(timer.title("LearnOpenGL"), "LearnOpenGL - 0 ms/frame 0");
    }

    #[test]
    fn steady_sixty_hertz() {
        let mut timer = FrameTimer::new();
        for _ in 0..30 {
            timer.record(1.0 / 60.0);
        }
        assert_relative_eq!(timer.framerate(), 60.0, epsilon = 1e-2);
        assert_eq!(timer.title("LearnOpenGL"), "LearnOpenGL - 17 ms/frame 60");
    }

    #[test]
    fn window_only_keeps_recent_frames() {
        let mut timer = FrameTimer::new();
        for _ in 0..SAMPLE_COUNT {
            timer.record(0.1);
        }
        for _ in 0..SAMPLE_COUNT {
            timer.record(0.01);
        }
        assert_relative_eq!(timer.framerate(), 100.0, epsilon = 1e-1);
    }

    #[test]
    fn long_frame_leaves_no_residue_once_evicted() {
        let mut timer = FrameTimer::new();
        timer.record(1000.0);
        for _ in 0..SAMPLE_COUNT {
            timer.record(0.016);
        }
        assert_relative_eq!(timer.framerate(), 62.5, max_relative = 1e-4);
    }

    #[test]
    fn ignores_non_positive_deltas() {
        let mut timer = FrameTimer::new();
        timer.record(0.0);
        timer.record(-1.0);
        timer.record(f32::NAN);
        assert_eq!(timer.framerate(), 0.0);
    }
}
