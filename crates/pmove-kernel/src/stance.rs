//! Bounding box, ducking and position validation.

use glam::Vec3;
use tracing::trace;

use pmove_core::{BoundsMode, Buttons, ContentFlags, GeometryQuery, LiquidLevel, PmFlags, PmType};

use crate::context::MoveContext;

/// Jitter offsets tried per axis when searching for a valid start position.
const SNAP_OFFSETS: [f32; 3] = [0.0, -1.0, 1.0];

impl<G: GeometryQuery + ?Sized> MoveContext<'_, G> {
    /// Pick the bounds mode for the current type and duck state.
    pub(crate) fn set_dimensions(&mut self) {
        let mode = match self.state.pm_type {
            PmType::Spectator | PmType::Noclip => BoundsMode::Flying,
            PmType::Gib => BoundsMode::Gibbed,
            PmType::Dead => BoundsMode::Ducked,
            _ if self.state.pm_flags.contains(PmFlags::DUCKED) => BoundsMode::Ducked,
            _ => BoundsMode::Standup,
        };

        let bounds = mode.bounds();
        self.state.bounds_mode = mode;
        self.mins = bounds.mins;
        self.maxs = bounds.maxs;
    }

    /// Ease the eye height toward the target of the current bounds mode.
    pub(crate) fn ease_view_height(&mut self) {
        let target = self.state.bounds().view_height;
        let ease = self.params.duck_ease_msec;
        if ease == 0 {
            self.state.view_height = target;
            return;
        }

        let standing = BoundsMode::Standup.bounds().view_height;
        let ducked = BoundsMode::Ducked.bounds().view_height;
        let max_step = (standing - ducked) * f32::from(self.cmd.msec) / f32::from(ease);

        let delta = target - self.state.view_height;
        self.state.view_height += delta.clamp(-max_step, max_step);
    }

    /// Solid directly below, or only liquid?
    fn above_water(&self) -> bool {
        let below = self.origin - Vec3::new(0.0, 0.0, 8.0);

        let solid_below = self
            .trace_mask(self.origin, below, ContentFlags::MASK_SOLID)
            .hit();
        if solid_below {
            return false;
        }

        self.trace_mask(self.origin, below, ContentFlags::MASK_WATER)
            .hit()
    }

    /// Duck or stand up as requested when the new box fits.
    ///
    /// Returns `true` when the stance changed.
    pub(crate) fn check_duck(&mut self) -> bool {
        if self.state.pm_type == PmType::Gib {
            return false;
        }

        let mut changed = false;
        let ducked = self.state.pm_flags.contains(PmFlags::DUCKED);

        if self.state.pm_type == PmType::Dead {
            if !ducked {
                self.state.pm_flags.insert(PmFlags::DUCKED);
                changed = true;
            }
        } else if self.cmd.buttons.contains(Buttons::CROUCH)
            && (self.is_grounded()
                || (self.liquid.level <= LiquidLevel::Feet && !self.above_water()))
            && !self.state.pm_flags.contains(PmFlags::ON_LADDER)
        {
            if !ducked {
                let maxs = BoundsMode::Ducked.bounds().maxs;
                let tracer = self.tracer().with_bounds(self.mins, maxs);
                if !tracer.trace(self.origin, self.origin).all_solid {
                    self.state.pm_flags.insert(PmFlags::DUCKED);
                    changed = true;
                }
            }
        } else if ducked {
            // try to stand up
            let maxs = BoundsMode::Standup.bounds().maxs;
            let tracer = self.tracer().with_bounds(self.mins, maxs);
            if !tracer.trace(self.origin, self.origin).all_solid {
                self.state.pm_flags.remove(PmFlags::DUCKED);
                changed = true;
            }
        }

        if changed {
            self.set_dimensions();
        }
        changed
    }

    /// Check the box fits at `origin`.
    pub(crate) fn good_position(&self, origin: Vec3) -> bool {
        if self.state.pm_type == PmType::Noclip {
            return true;
        }
        !self.trace(origin, origin).all_solid
    }

    /// Jitter the origin by up to a unit per axis until the box fits.
    pub(crate) fn initial_snap_position(&mut self) {
        let base = self.origin;
        for dz in SNAP_OFFSETS {
            for dy in SNAP_OFFSETS {
                for dx in SNAP_OFFSETS {
                    let candidate = base + Vec3::new(dx, dy, dz);
                    if self.good_position(candidate) {
                        self.origin = candidate;
                        self.previous_origin = candidate;
                        return;
                    }
                }
            }
        }
    }

    /// Write the locals back into the state.
    ///
    /// A move that ended inside solid falls back to the origin it started
    /// from when that one is still valid.
    pub(crate) fn snap_position(&mut self) {
        if !self.good_position(self.origin) && self.good_position(self.previous_origin) {
            trace!(origin = ?self.origin, "stuck, reverting to previous origin");
            self.origin = self.previous_origin;
        }
        self.state.velocity = self.velocity;
        self.state.origin = self.origin;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmove_core::{BoxWorld, Brush, EntityId, InputCommand, KinematicState, MoveParams};

    fn floor_with_ceiling(ceiling: f32) -> BoxWorld {
        BoxWorld::new()
            .with(Brush::solid(
                Vec3::new(-512.0, -512.0, -64.0),
                Vec3::new(512.0, 512.0, 0.0),
            ))
            .with(Brush::solid(
                Vec3::new(-512.0, -512.0, ceiling),
                Vec3::new(512.0, 512.0, ceiling + 64.0),
            ))
    }

    #[test]
    fn test_duck_and_stand() {
        let world = floor_with_ceiling(256.0);
        let params = MoveParams::default();
        let cmd = InputCommand::new(1, 16).with_buttons(Buttons::CROUCH);
        let mut ctx = MoveContext::new(&world, &params, cmd, KinematicState::at(Vec3::new(0.0, 0.0, 36.0)));
        ctx.ground.entity = Some(EntityId::WORLD);

        assert!(ctx.check_duck());
        assert_eq!(ctx.state.bounds_mode, BoundsMode::Ducked);
        assert_eq!(ctx.maxs.z, 8.0);

        ctx.cmd.buttons = Buttons::NONE;
        assert!(ctx.check_duck());
        assert_eq!(ctx.state.bounds_mode, BoundsMode::Standup);
    }

    #[test]
    fn test_cannot_stand_under_low_ceiling() {
        // room for the ducked box (top at 44) but not the standing one (72)
        let world = floor_with_ceiling(60.0);
        let params = MoveParams::default();
        let mut state = KinematicState::at(Vec3::new(0.0, 0.0, 36.0));
        state.pm_flags.insert(PmFlags::DUCKED);
        let mut ctx = MoveContext::new(&world, &params, InputCommand::new(1, 16), state);
        ctx.set_dimensions();

        assert!(!ctx.check_duck());
        assert!(ctx.state.pm_flags.contains(PmFlags::DUCKED));
    }

    #[test]
    fn test_gibbed_never_ducks() {
        let world = floor_with_ceiling(256.0);
        let params = MoveParams::default();
        let cmd = InputCommand::new(1, 16).with_buttons(Buttons::CROUCH);
        let state = KinematicState::at(Vec3::new(0.0, 0.0, 36.0)).with_type(PmType::Gib);
        let mut ctx = MoveContext::new(&world, &params, cmd, state);

        assert!(!ctx.check_duck());
    }

    #[test]
    fn test_view_height_eases() {
        let world = BoxWorld::new();
        let params = MoveParams::default();
        let mut state = KinematicState::at(Vec3::ZERO);
        state.bounds_mode = BoundsMode::Ducked;
        let mut ctx = MoveContext::new(&world, &params, InputCommand::new(1, 50), state);

        // half of the ease time covers half the distance
        ctx.ease_view_height();
        assert!((ctx.state.view_height - 17.0).abs() < 1e-4);

        ctx.ease_view_height();
        assert_eq!(ctx.state.view_height, 4.0);
        ctx.ease_view_height();
        assert_eq!(ctx.state.view_height, 4.0);
    }

    #[test]
    fn test_initial_snap_escapes_floor() {
        let world = floor_with_ceiling(256.0);
        let params = MoveParams::default();
        // box bottom sunk half a unit into the floor
        let state = KinematicState::at(Vec3::new(0.0, 0.0, 35.5));
        let mut ctx = MoveContext::new(&world, &params, InputCommand::new(1, 16), state);

        assert!(!ctx.good_position(ctx.origin));
        ctx.initial_snap_position();

        assert_eq!(ctx.origin, Vec3::new(0.0, 0.0, 36.5));
        assert!(ctx.good_position(ctx.origin));
    }
}
