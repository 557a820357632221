//! Movement tunables
//!
//! One immutable `MoveParams` value is handed to every kernel invocation, so
//! client and server each hold their own copy. The defaults are the
//! authoritative parameter set; hosts may load overrides from RON text.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tunable constants of the movement kernel.
///
/// # Example
///
/// ```
/// use pmove_core::MoveParams;
///
/// let params = MoveParams::from_ron_str("(max_speed: 320.0)").unwrap();
/// assert_eq!(params.max_speed, 320.0);
/// assert_eq!(params.friction, MoveParams::default().friction);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveParams {
    /// Below this speed friction acts as if moving at this speed
    pub stop_speed: f32,
    /// Running wish-speed cap
    pub max_speed: f32,
    /// Wish-speed cap while ducked
    pub duck_speed: f32,
    /// Vertical speed given by a jump
    pub jump_speed: f32,
    /// Climb speed on ladders
    pub ladder_speed: f32,
    /// Strafe speed cap on ladders
    pub ladder_side_speed: f32,
    /// Strafe speed scale on ladders when not swimming
    pub ladder_mod: f32,
    /// Swim speed and water current strength
    pub water_speed: f32,
    /// Wish-speed cap while flying, doubled after clamping
    pub fly_speed: f32,
    /// Conveyor strength of ground currents
    pub conveyor_speed: f32,

    pub accelerate: f32,
    /// Acceleration while airborne, `0` falls back to plain acceleration of 1
    pub air_accelerate: f32,
    /// Wish speed used for the air-control limit
    pub air_wish_cap: f32,
    pub water_accelerate: f32,
    pub fly_accelerate: f32,

    pub friction: f32,
    pub fly_friction: f32,
    pub water_friction: f32,

    pub gravity: f32,

    /// Highest obstacle that is stepped over
    pub step_size: f32,
    /// Smallest vertical change reported as a step
    pub step_min_size: f32,
    /// Downward probe distance for ground classification
    pub ground_probe: f32,
    /// Planes with a smaller normal z are walls
    pub min_step_normal: f32,
    /// Upward speed above which the ground probe is skipped
    pub ground_skip_speed: f32,

    /// Overbounce used when clipping velocity against planes
    pub overclip: f32,
    /// Velocity components smaller than this snap to zero after a clip
    pub stop_epsilon: f32,
    /// Clip planes and bumps per slide move
    pub max_clip_planes: usize,

    /// Time for the eye height to reach a new stance
    pub duck_ease_msec: u16,
    /// Landing impact above which a hard fall is reported
    pub hard_landing_delta: f32,
}

impl Default for MoveParams {
    fn default() -> Self {
        Self {
            stop_speed: 100.0,
            max_speed: 300.0,
            duck_speed: 100.0,
            jump_speed: 270.0,
            ladder_speed: 200.0,
            ladder_side_speed: 150.0,
            ladder_mod: 0.5,
            water_speed: 400.0,
            fly_speed: 300.0,
            conveyor_speed: 100.0,

            accelerate: 10.0,
            air_accelerate: 1.0,
            air_wish_cap: 30.0,
            water_accelerate: 10.0,
            fly_accelerate: 10.0,

            friction: 6.0,
            fly_friction: 9.0,
            water_friction: 1.0,

            gravity: 800.0,

            step_size: 18.0,
            step_min_size: 2.0,
            ground_probe: 0.25,
            min_step_normal: 0.7,
            ground_skip_speed: 180.0,

            overclip: 1.001,
            stop_epsilon: 0.1,
            max_clip_planes: 16,

            duck_ease_msec: 100,
            hard_landing_delta: 40.0,
        }
    }
}

impl MoveParams {
    /// Smallest allowed clip plane budget
    pub const MIN_CLIP_PLANES: usize = 8;
    /// Largest allowed clip plane budget
    pub const MAX_CLIP_PLANES: usize = 16;

    /// Parse parameters from RON text, filling omitted fields with defaults
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let params: Self = ron::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize to pretty RON text
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Check the parameters are usable by the kernel
    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_CLIP_PLANES..=Self::MAX_CLIP_PLANES).contains(&self.max_clip_planes) {
            return Err(Error::InvalidParams(format!(
                "max_clip_planes must be within {}..={}, got {}",
                Self::MIN_CLIP_PLANES,
                Self::MAX_CLIP_PLANES,
                self.max_clip_planes
            )));
        }
        if self.overclip < 1.0 {
            return Err(Error::InvalidParams(format!(
                "overclip must be at least 1.0, got {}",
                self.overclip
            )));
        }
        if !(0.0..=1.0).contains(&self.min_step_normal) {
            return Err(Error::InvalidParams(format!(
                "min_step_normal must be within 0..=1, got {}",
                self.min_step_normal
            )));
        }
        let non_negative = [
            ("stop_speed", self.stop_speed),
            ("max_speed", self.max_speed),
            ("duck_speed", self.duck_speed),
            ("step_size", self.step_size),
            ("ground_probe", self.ground_probe),
            ("stop_epsilon", self.stop_epsilon),
            ("friction", self.friction),
            ("water_friction", self.water_friction),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(Error::InvalidParams(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let params = MoveParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.max_clip_planes, 16);
        assert_eq!(params.overclip, 1.001);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let params = MoveParams::from_ron_str("(gravity: 400.0, ladder_speed: 150.0)").unwrap();
        assert_eq!(params.gravity, 400.0);
        assert_eq!(params.ladder_speed, 150.0);
        assert_eq!(params.max_speed, 300.0);
    }

    #[test]
    fn test_ron_round_trip() {
        let mut params = MoveParams::default();
        params.air_accelerate = 8.0;

        let text = params.to_ron_string().unwrap();
        let parsed = MoveParams::from_ron_str(&text).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn test_invalid_clip_planes() {
        let result = MoveParams::from_ron_str("(max_clip_planes: 4)");
        assert!(matches!(result, Err(Error::InvalidParams(_))));
    }

    #[test]
    fn test_invalid_overclip() {
        let params = MoveParams {
            overclip: 0.5,
            ..MoveParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_malformed_ron() {
        let result = MoveParams::from_ron_str("(gravity: ");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
