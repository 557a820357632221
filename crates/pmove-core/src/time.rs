//! Frame numbering and per-command time steps
//!
//! - `Frame` - Monotonic command/snapshot identifier
//! - `FrameRate` - Server simulation rate and the frame duration it implies

use serde::{Deserialize, Serialize};

/// A command frame number (logical time unit shared by client and server)
pub type Frame = u64;

/// Server frame rate the prediction tolerances are derived from
pub const BASE_FRAMERATE: u32 = 40;

/// Convert a command duration in milliseconds into seconds
#[inline]
pub fn msec_to_seconds(msec: u8) -> f32 {
    msec as f32 * 0.001
}

/// Simulation rate settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRate {
    /// Frames per second
    hz: u32,
}

impl FrameRate {
    /// Create a frame rate, clamped to `[1, 1000]` Hz
    pub fn new(hz: u32) -> Self {
        Self {
            hz: hz.clamp(1, 1000),
        }
    }

    /// Frames per second
    pub fn hz(&self) -> u32 {
        self.hz
    }

    /// Duration of one frame in milliseconds, as carried by `InputCommand::msec`
    pub fn frame_msec(&self) -> u8 {
        (1000 / self.hz).clamp(1, u8::MAX as u32) as u8
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new(BASE_FRAMERATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate() {
        let rate = FrameRate::default();
        assert_eq!(rate.hz(), 40);
        assert_eq!(rate.frame_msec(), 25);
    }

    #[test]
    fn test_rate_clamped() {
        assert_eq!(FrameRate::new(0).hz(), 1);
        assert_eq!(FrameRate::new(1).frame_msec(), 255);
        assert_eq!(FrameRate::new(5000).hz(), 1000);
    }

    #[test]
    fn test_msec_to_seconds() {
        assert!((msec_to_seconds(16) - 0.016).abs() < 1e-6);
        assert_eq!(msec_to_seconds(0), 0.0);
    }
}
