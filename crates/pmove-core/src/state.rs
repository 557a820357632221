//! Kinematic player state and the per-tick contact classification.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::flags::{ContentFlags, PmFlags};
use crate::trace::{EntityId, MaterialId, Plane, Surface};

/// Movement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PmType {
    /// Regular walking, swimming and climbing
    #[default]
    Normal,
    /// Flies through the world, clipping against world geometry only
    Spectator,
    /// Flies through everything
    Noclip,
    /// Dead body, no input
    Dead,
    /// Gibbed body, no input
    Gib,
    /// No movement at all
    Freeze,
}

impl PmType {
    /// Check if this mode ignores player input.
    pub fn is_lifeless(self) -> bool {
        matches!(self, PmType::Dead | PmType::Gib | PmType::Freeze)
    }

    /// Check if this mode flies instead of walking.
    pub fn is_flying(self) -> bool {
        matches!(self, PmType::Spectator | PmType::Noclip)
    }
}

/// Which bounding box the player occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoundsMode {
    #[default]
    Standup,
    Ducked,
    Gibbed,
    Flying,
}

/// Collision box and eye height for a `BoundsMode`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBounds {
    pub mins: Vec3,
    pub maxs: Vec3,
    pub view_height: f32,
}

impl BoundsMode {
    /// Box and eye height for this mode.
    pub const fn bounds(self) -> PlayerBounds {
        match self {
            BoundsMode::Standup => PlayerBounds {
                mins: Vec3::new(-16.0, -16.0, -36.0),
                maxs: Vec3::new(16.0, 16.0, 36.0),
                view_height: 30.0,
            },
            BoundsMode::Ducked => PlayerBounds {
                mins: Vec3::new(-16.0, -16.0, -36.0),
                maxs: Vec3::new(16.0, 16.0, 8.0),
                view_height: 4.0,
            },
            BoundsMode::Gibbed => PlayerBounds {
                mins: Vec3::new(-16.0, -16.0, 0.0),
                maxs: Vec3::new(16.0, 16.0, 24.0),
                view_height: 8.0,
            },
            BoundsMode::Flying => PlayerBounds {
                mins: Vec3::new(-8.0, -8.0, -8.0),
                maxs: Vec3::new(8.0, 8.0, 8.0),
                view_height: 0.0,
            },
        }
    }
}

/// The kinematic part of a player state.
///
/// Replaced wholesale by every movement tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicState {
    pub origin: Vec3,
    pub velocity: Vec3,
    pub pm_type: PmType,
    pub pm_flags: PmFlags,
    /// Remaining milliseconds of the active `TIME_*` flag
    pub pm_time: u16,
    /// Added to command angles to produce view angles
    pub delta_angles: Vec3,
    /// Current, possibly easing, eye height
    pub view_height: f32,
    pub bounds_mode: BoundsMode,
}

impl KinematicState {
    /// A standing player at `origin`.
    pub fn at(origin: Vec3) -> Self {
        Self {
            origin,
            view_height: BoundsMode::Standup.bounds().view_height,
            ..Self::default()
        }
    }

    /// Builder for the movement mode.
    pub fn with_type(mut self, pm_type: PmType) -> Self {
        self.pm_type = pm_type;
        self
    }

    /// Builder for the velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Collision box and target eye height of the current bounds mode.
    pub fn bounds(&self) -> PlayerBounds {
        self.bounds_mode.bounds()
    }

    pub fn is_on_ground(&self) -> bool {
        self.pm_flags.contains(PmFlags::ON_GROUND)
    }

    pub fn is_ducked(&self) -> bool {
        self.pm_flags.contains(PmFlags::DUCKED)
    }
}

/// How deep the player is submerged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum LiquidLevel {
    #[default]
    None,
    Feet,
    Waist,
    Under,
}

impl LiquidLevel {
    /// Depth as a drag multiplier.
    pub fn depth(self) -> f32 {
        match self {
            LiquidLevel::None => 0.0,
            LiquidLevel::Feet => 1.0,
            LiquidLevel::Waist => 2.0,
            LiquidLevel::Under => 3.0,
        }
    }
}

/// Liquid the player is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiquidInfo {
    /// Contents sampled at the feet
    pub kind: ContentFlags,
    pub level: LiquidLevel,
}

/// Surface the player is standing on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroundInfo {
    /// `None` while airborne
    pub entity: Option<EntityId>,
    pub plane: Plane,
    pub surface: Surface,
    pub contents: ContentFlags,
    pub material: Option<MaterialId>,
}

impl GroundInfo {
    pub fn is_grounded(&self) -> bool {
        self.entity.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_modes() {
        let standing = BoundsMode::Standup.bounds();
        let ducked = BoundsMode::Ducked.bounds();

        assert_eq!(standing.mins, ducked.mins);
        assert!(ducked.maxs.z < standing.maxs.z);
        assert!(ducked.view_height < standing.view_height);
        assert_eq!(BoundsMode::Flying.bounds().view_height, 0.0);
    }

    #[test]
    fn test_liquid_levels_ordered() {
        assert!(LiquidLevel::Under > LiquidLevel::Waist);
        assert!(LiquidLevel::Waist > LiquidLevel::Feet);
        assert_eq!(LiquidLevel::Waist.depth(), 2.0);
    }

    #[test]
    fn test_state_at() {
        let state = KinematicState::at(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.view_height, 30.0);
        assert_eq!(state.bounds_mode, BoundsMode::Standup);
        assert!(!state.is_on_ground());
    }

    #[test]
    fn test_lifeless_types() {
        assert!(PmType::Dead.is_lifeless());
        assert!(PmType::Freeze.is_lifeless());
        assert!(!PmType::Spectator.is_lifeless());
        assert!(PmType::Noclip.is_flying());
    }
}
