//! Prediction Configuration - Tolerances and smoothing constants
//!
//! `PredictionConfig` holds the client-side knobs of prediction: how large a
//! miss is tolerated, when a miss becomes a hard snap, how long a backlog may
//! be replayed and how stair steps are smoothed. The movement tunables
//! themselves live in `pmove_core::MoveParams` and must match the server.

use serde::{Deserialize, Serialize};

use pmove_core::BASE_FRAMERATE;

/// Largest replay backlog accepted by `set_max_replay`
pub const MAX_REPLAY_LIMIT: usize = 1024;

/// Client prediction settings
///
/// # Example
///
/// ```
/// use pmove_netcode::PredictionConfig;
///
/// let mut config = PredictionConfig::default();
/// assert_eq!(config.snap_distance(), 60.0);
///
/// // the snap distance never drops below the miss tolerance
/// config.set_snap_distance(0.0);
/// assert_eq!(config.snap_distance(), config.miss_tolerance());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Origin error up to which prediction counts as in sync
    miss_tolerance: f32,
    /// Origin error above which the view snaps instead of smoothing
    snap_distance: f32,
    /// Most commands replayed per prediction before degrading
    max_replay: usize,
    /// Duration of the visual step interpolation, in milliseconds
    step_time_msec: u32,
    /// Largest accumulated step offset
    max_step_change: f32,
    /// Vertical changes outside `step_min_size..step_max_size` are not steps
    step_min_size: f32,
    step_max_size: f32,
}

impl PredictionConfig {
    pub fn miss_tolerance(&self) -> f32 {
        self.miss_tolerance
    }

    /// Set the miss tolerance, clamped to be non-negative.
    pub fn set_miss_tolerance(&mut self, tolerance: f32) {
        self.miss_tolerance = tolerance.max(0.0);
        self.snap_distance = self.snap_distance.max(self.miss_tolerance);
    }

    pub fn snap_distance(&self) -> f32 {
        self.snap_distance
    }

    /// Set the snap distance, clamped to at least the miss tolerance.
    pub fn set_snap_distance(&mut self, distance: f32) {
        self.snap_distance = distance.max(self.miss_tolerance);
    }

    pub fn max_replay(&self) -> usize {
        self.max_replay
    }

    /// Set the replay budget, clamped to `[1, MAX_REPLAY_LIMIT]`.
    pub fn set_max_replay(&mut self, n: usize) {
        self.max_replay = n.clamp(1, MAX_REPLAY_LIMIT);
    }

    pub fn step_time_msec(&self) -> u32 {
        self.step_time_msec
    }

    /// Set the step interpolation time, at least one millisecond.
    pub fn set_step_time_msec(&mut self, msec: u32) {
        self.step_time_msec = msec.max(1);
    }

    pub fn max_step_change(&self) -> f32 {
        self.max_step_change
    }

    pub fn set_max_step_change(&mut self, change: f32) {
        self.max_step_change = change.max(0.0);
    }

    /// Smallest and largest vertical change treated as a step.
    pub fn step_range(&self) -> (f32, f32) {
        (self.step_min_size, self.step_max_size)
    }

    /// Set the step range; the bounds are swapped if given in reverse.
    pub fn set_step_range(&mut self, min: f32, max: f32) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.step_min_size = min.max(0.0);
        self.step_max_size = max.max(0.0);
    }

    /// Check a vertical change against the step range.
    pub fn is_step_size(&self, step: f32) -> bool {
        let size = step.abs();
        size > self.step_min_size && size < self.step_max_size
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            miss_tolerance: 0.1,
            snap_distance: 2400.0 / BASE_FRAMERATE as f32,
            max_replay: 64,
            step_time_msec: 100,
            max_step_change: 32.0,
            step_min_size: 2.0,
            step_max_size: 18.0,
        }
    }
}
