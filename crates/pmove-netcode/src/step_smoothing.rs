//! Visual smoothing of stair steps and view height changes
//!
//! The kernel moves the player up a stair in a single tick. Rendering that
//! literally makes the camera pop, so the predictor records the step and the
//! renderer subtracts a decaying offset until the step time has passed.
//! Times are host milliseconds passed in by the caller.

use serde::{Deserialize, Serialize};

use crate::config::PredictionConfig;

/// Decaying vertical offset left behind by the last step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSmoother {
    /// Step height when the step started
    height: f32,
    /// When the step started
    changed_ms: u64,
    step_time_msec: u32,
    max_change: f32,
}

impl StepSmoother {
    pub fn new(config: &PredictionConfig) -> Self {
        Self {
            height: 0.0,
            changed_ms: 0,
            step_time_msec: config.step_time_msec(),
            max_change: config.max_step_change(),
        }
    }

    /// Start a new step of `step` units at `now_ms`.
    ///
    /// A step that is still decaying carries over into the new one.
    pub fn start(&mut self, step: f32, now_ms: u64) {
        let carried = self.offset(now_ms);
        self.height = (carried + step).clamp(-self.max_change, self.max_change);
        self.changed_ms = now_ms;
    }

    /// Offset still to be subtracted from the view at `now_ms`.
    pub fn offset(&self, now_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.changed_ms);
        let duration = u64::from(self.step_time_msec);
        if elapsed >= duration {
            return 0.0;
        }
        self.height * (duration - elapsed) as f32 / duration as f32
    }

    /// Check if a step is still decaying.
    pub fn is_active(&self, now_ms: u64) -> bool {
        self.offset(now_ms) != 0.0
    }

    /// Drop any step in progress.
    pub fn reset(&mut self, now_ms: u64) {
        self.height = 0.0;
        self.changed_ms = now_ms;
    }
}

/// Previous and current eye height, for easing the camera between them
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewHeightTransition {
    pub previous: f32,
    pub current: f32,
    /// When `current` last changed
    pub changed_ms: u64,
}

impl ViewHeightTransition {
    pub fn new(height: f32, now_ms: u64) -> Self {
        Self {
            previous: height,
            current: height,
            changed_ms: now_ms,
        }
    }

    /// Record a new eye height. Returns `true` if it changed.
    pub fn update(&mut self, height: f32, now_ms: u64) -> bool {
        if height == self.current {
            return false;
        }
        self.previous = self.current;
        self.current = height;
        self.changed_ms = now_ms;
        true
    }

    /// Eye height at `now_ms` when easing over `duration_ms`.
    pub fn lerp(&self, now_ms: u64, duration_ms: u64) -> f32 {
        if duration_ms == 0 {
            return self.current;
        }
        let elapsed = now_ms.saturating_sub(self.changed_ms).min(duration_ms);
        let frac = elapsed as f32 / duration_ms as f32;
        self.previous + (self.current - self.previous) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoother() -> StepSmoother {
        StepSmoother::new(&PredictionConfig::default())
    }

    #[test]
    fn test_step_decays_linearly() {
        let mut step = smoother();
        step.start(12.0, 1000);

        assert_eq!(step.offset(1000), 12.0);
        assert!((step.offset(1050) - 6.0).abs() < 1e-5);
        assert_eq!(step.offset(1100), 0.0);
        assert!(!step.is_active(1200));
    }

    #[test]
    fn test_unfinished_step_carries_over() {
        let mut step = smoother();
        step.start(16.0, 0);
        // a quarter of the way through another step begins
        step.start(16.0, 25);

        assert!((step.offset(25) - 28.0).abs() < 1e-5);
    }

    #[test]
    fn test_step_clamped() {
        let mut step = smoother();
        step.start(17.0, 0);
        step.start(17.0, 0);
        step.start(17.0, 0);

        assert_eq!(step.offset(0), 32.0);

        step.reset(0);
        assert_eq!(step.offset(0), 0.0);
    }

    #[test]
    fn test_view_height_transition() {
        let mut view = ViewHeightTransition::new(30.0, 0);
        assert!(!view.update(30.0, 10));

        assert!(view.update(4.0, 100));
        assert_eq!(view.previous, 30.0);
        assert_eq!(view.current, 4.0);
        assert_eq!(view.lerp(100, 100), 30.0);
        assert_eq!(view.lerp(150, 100), 17.0);
        assert_eq!(view.lerp(500, 100), 4.0);
    }
}
