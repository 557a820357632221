//! Content, surface, movement-state and button flags.
//!
//! Content flags select what a trace collides with; surface flags describe
//! how a touched face behaves; `PmFlags` carry movement state across ticks;
//! `Buttons` are the digital inputs of an `InputCommand`.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Content flags describe what type of volume something is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ContentFlags: u32 {
        /// Solid world geometry.
        const SOLID = 1 << 0;
        /// Translucent but solid (glass).
        const WINDOW = 1 << 1;
        const LAVA = 1 << 3;
        const SLIME = 1 << 4;
        const WATER = 1 << 5;
        const MIST = 1 << 6;
        /// Blocks players only.
        const PLAYER_CLIP = 1 << 16;
        /// Blocks monsters only.
        const MONSTER_CLIP = 1 << 17;

        /// Current pushing toward +X.
        const CURRENT_0 = 1 << 18;
        /// Current pushing toward +Y.
        const CURRENT_90 = 1 << 19;
        /// Current pushing toward -X.
        const CURRENT_180 = 1 << 20;
        /// Current pushing toward -Y.
        const CURRENT_270 = 1 << 21;
        const CURRENT_UP = 1 << 22;
        const CURRENT_DOWN = 1 << 23;

        const MONSTER = 1 << 25;
        const DEAD_MONSTER = 1 << 26;
        /// Climbable volume.
        const LADDER = 1 << 29;
        /// Other player bodies.
        const PLAYER = 1 << 30;

        /// Anything that blocks a plain box.
        const MASK_SOLID = Self::SOLID.bits() | Self::WINDOW.bits();
        /// What a living player collides with.
        const MASK_PLAYER_SOLID = Self::SOLID.bits()
            | Self::PLAYER_CLIP.bits()
            | Self::WINDOW.bits()
            | Self::MONSTER.bits()
            | Self::PLAYER.bits();
        /// What a dead or gibbed player collides with.
        const MASK_DEAD_SOLID = Self::SOLID.bits() | Self::PLAYER_CLIP.bits() | Self::WINDOW.bits();
        /// Any swimmable liquid.
        const MASK_WATER = Self::WATER.bits() | Self::LAVA.bits() | Self::SLIME.bits();
        /// All six directional currents.
        const MASK_CURRENT = Self::CURRENT_0.bits()
            | Self::CURRENT_90.bits()
            | Self::CURRENT_180.bits()
            | Self::CURRENT_270.bits()
            | Self::CURRENT_UP.bits()
            | Self::CURRENT_DOWN.bits();
    }
}

impl ContentFlags {
    pub const EMPTY: Self = Self::empty();
}

bitflags::bitflags! {
    /// Surface flags describe properties of a touched face.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SurfaceFlags: u32 {
        const LIGHT = 1 << 0;
        /// No ground friction.
        const SLICK = 1 << 1;
        const SKY = 1 << 2;
        const WARP = 1 << 3;
        /// No footstep sounds.
        const NO_STEPS = 1 << 4;
    }
}

impl SurfaceFlags {
    pub const NONE: Self = Self::empty();
}

bitflags::bitflags! {
    /// Movement state flags carried in `KinematicState` between ticks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PmFlags: u16 {
        const DUCKED = 1 << 0;
        /// Jump must be released before it can trigger again.
        const JUMP_HELD = 1 << 1;
        const ON_GROUND = 1 << 2;
        /// `pm_time` is the water jump timer.
        const TIME_WATERJUMP = 1 << 3;
        /// `pm_time` is the landing recovery timer.
        const TIME_LAND = 1 << 4;
        /// `pm_time` is the teleport freeze timer.
        const TIME_TELEPORT = 1 << 5;
        const ON_LADDER = 1 << 6;
        /// Server asks the client not to predict the origin.
        const NO_POSITIONAL_PREDICTION = 1 << 7;

        /// Every timer flag.
        const TIME_MASK = Self::TIME_WATERJUMP.bits()
            | Self::TIME_LAND.bits()
            | Self::TIME_TELEPORT.bits();
    }
}

impl PmFlags {
    pub const NONE: Self = Self::empty();
}

bitflags::bitflags! {
    /// Digital inputs of an `InputCommand`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Buttons: u16 {
        const ATTACK = 1 << 0;
        const USE = 1 << 1;
        const JUMP = 1 << 2;
        const CROUCH = 1 << 3;
        const WALK = 1 << 4;
        /// Set by the client when any key is down.
        const ANY = 1 << 15;
    }
}

impl Buttons {
    pub const NONE: Self = Self::empty();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_flags_operations() {
        let combined = ContentFlags::SOLID | ContentFlags::WATER;

        assert!(combined.contains(ContentFlags::SOLID));
        assert!(combined.contains(ContentFlags::WATER));
        assert!(!combined.contains(ContentFlags::LAVA));
        assert!(combined.intersects(ContentFlags::MASK_WATER));
    }

    #[test]
    fn test_player_masks() {
        assert!(ContentFlags::MASK_PLAYER_SOLID.contains(ContentFlags::PLAYER_CLIP));
        assert!(ContentFlags::MASK_PLAYER_SOLID.contains(ContentFlags::PLAYER));
        assert!(!ContentFlags::MASK_DEAD_SOLID.intersects(ContentFlags::PLAYER));
        assert!(!ContentFlags::MASK_SOLID.intersects(ContentFlags::LADDER));
    }

    #[test]
    fn test_current_mask_has_six_bits() {
        assert_eq!(ContentFlags::MASK_CURRENT.bits().count_ones(), 6);
    }

    #[test]
    fn test_pm_flags_set_and_remove() {
        let mut flags = PmFlags::NONE;
        flags.insert(PmFlags::DUCKED | PmFlags::TIME_LAND);
        assert!(flags.intersects(PmFlags::TIME_MASK));

        flags.remove(PmFlags::TIME_MASK);
        assert_eq!(flags, PmFlags::DUCKED);

        flags.set(PmFlags::ON_GROUND, true);
        assert!(flags.contains(PmFlags::ON_GROUND | PmFlags::DUCKED));
    }

    #[test]
    fn test_empty_constants() {
        assert!(ContentFlags::EMPTY.is_empty());
        assert_eq!(PmFlags::default(), PmFlags::NONE);
        assert!(!Buttons::NONE.intersects(Buttons::all()));
    }
}
