//! Server state reconciliation
//!
//! When an authoritative state for frame F arrives, the origin the client
//! predicted for F is compared against it. Any newer baseline replaces the
//! current one; the size of the miss only decides how the correction is
//! shown. Snapshots that arrive late are ignored.

use glam::Vec3;
use tracing::{debug, warn};

use pmove_core::CommandHistory;

use crate::prediction::{PredictionBaseline, Predictor};
use crate::step_smoothing::ViewHeightTransition;

/// How a new baseline related to what had been predicted for its frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReconcileOutcome {
    /// Not newer than the current baseline, ignored
    Stale,
    /// No prediction existed for the frame
    FirstBaseline,
    /// Miss within tolerance, nothing visible happens
    InSync { error: Vec3 },
    /// Miss above tolerance, smoothed out by the renderer
    Corrected { error: Vec3 },
    /// Miss too large to smooth, the view jumps
    Snapped { error: Vec3 },
}

impl ReconcileOutcome {
    /// Check if the next prediction replays from a corrected state.
    pub fn is_correction(&self) -> bool {
        matches!(self, Self::Corrected { .. } | Self::Snapped { .. })
    }
}

impl<H: CommandHistory> Predictor<H> {
    /// Adopt a new authoritative baseline.
    ///
    /// Compares the server's origin for `baseline.frame` with the origin
    /// predicted for that frame, then replaces the baseline. The next
    /// `predict` replays from it. A baseline not newer than the current one
    /// changes nothing.
    pub fn reconcile(&mut self, baseline: PredictionBaseline, now_ms: u64) -> ReconcileOutcome {
        if let Some(current) = &self.baseline {
            if baseline.frame <= current.frame {
                debug!(frame = baseline.frame, current = current.frame, "stale baseline ignored");
                return ReconcileOutcome::Stale;
            }
        }

        let outcome = match self.predicted_origin(baseline.frame) {
            None => {
                self.snap_view(&baseline, now_ms);
                ReconcileOutcome::FirstBaseline
            }
            Some(predicted) => {
                let authoritative = baseline.state.origin;
                let error = predicted - authoritative;
                let miss = error.length();
                let tolerance = self.config.miss_tolerance();

                if compare::within_tolerance(predicted, authoritative, tolerance) {
                    self.error = error;
                    ReconcileOutcome::InSync { error }
                } else if miss > self.config.snap_distance() {
                    warn!(frame = baseline.frame, miss, "prediction miss, snapping");
                    self.snap_view(&baseline, now_ms);
                    ReconcileOutcome::Snapped { error }
                } else {
                    debug!(frame = baseline.frame, miss, "prediction miss, correcting");
                    self.error = error;
                    ReconcileOutcome::Corrected { error }
                }
            }
        };

        self.baseline = Some(baseline);
        outcome
    }

    /// Drop every visual correction and jump to `baseline`.
    fn snap_view(&mut self, baseline: &PredictionBaseline, now_ms: u64) {
        self.error = Vec3::ZERO;
        self.step.reset(now_ms);
        self.view = ViewHeightTransition::new(baseline.state.view_height, now_ms);
        self.last = None;
    }

    /// Offset to add to the rendered origin.
    ///
    /// `backlerp` runs from 1 just after a snapshot to 0 at the next one.
    pub fn render_error(&self, backlerp: f32) -> Vec3 {
        self.error * backlerp.clamp(0.0, 1.0)
    }
}

/// State comparison utilities
pub mod compare {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use glam::Vec3;
    use pmove_core::KinematicState;

    use crate::Result;

    /// Check two origins are within `tolerance` of each other
    pub fn within_tolerance(predicted: Vec3, authoritative: Vec3, tolerance: f32) -> bool {
        predicted.distance(authoritative) <= tolerance
    }

    /// Compute a checksum of a state for quick comparison
    ///
    /// The state is encoded with bincode first, so two states hash equal only
    /// when every float has the same bit pattern.
    pub fn state_checksum(state: &KinematicState) -> Result<u64> {
        let bytes = bincode::serialize(state)?;
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Ok(hasher.finish())
    }
}
