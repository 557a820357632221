//! Ground and liquid classification.

use glam::Vec3;
use tracing::trace;

use pmove_core::{ContentFlags, GeometryQuery, GroundInfo, LiquidInfo, LiquidLevel, PmFlags};

use crate::context::MoveContext;
use crate::outcome::MoveOutcome;
use crate::slide::clip_velocity;

/// Overbounce used to measure the landing impact.
const IMPACT_OVERCLIP: f32 = 1.01;

/// Landing while ducked blocks jumping for this many milliseconds.
const LAND_TIME_MSEC: u16 = 128;

impl<G: GeometryQuery + ?Sized> MoveContext<'_, G> {
    /// Sample liquid at feet, waist and eye height around `position`.
    pub(crate) fn liquid_at(&self, position: Vec3) -> LiquidInfo {
        let sample2 = (self.state.view_height - self.mins.z).trunc();
        let sample1 = (sample2 / 2.0).trunc();
        let base = position.z + self.mins.z;
        let contents_at = |z: f32| self.geometry.point_contents(Vec3::new(position.x, position.y, z));

        let feet = contents_at(base + 1.0);
        if !feet.intersects(ContentFlags::MASK_WATER) {
            return LiquidInfo::default();
        }

        let mut liquid = LiquidInfo {
            kind: feet,
            level: LiquidLevel::Feet,
        };
        if contents_at(base + sample1).intersects(ContentFlags::MASK_WATER) {
            liquid.level = LiquidLevel::Waist;
            if contents_at(base + sample2).intersects(ContentFlags::MASK_WATER) {
                liquid.level = LiquidLevel::Under;
            }
        }
        liquid
    }

    /// Probe the ground below the box and sample the liquid level.
    pub(crate) fn categorize_position(&mut self) {
        if self.velocity.z > self.params.ground_skip_speed {
            // moving up fast, don't snap to the ground on takeoff
            self.state.pm_flags.remove(PmFlags::ON_GROUND);
            self.clear_ground();
        } else {
            let point = self.origin - Vec3::new(0.0, 0.0, self.params.ground_probe);
            let trace = self.trace(self.origin, point);

            self.ground = GroundInfo {
                entity: None,
                plane: trace.plane,
                surface: trace.surface.clone(),
                contents: trace.contents,
                material: trace.surface.material,
            };

            // a steep slope still counts as ground when wedged against a wall
            let mut slanted = trace.hit() && trace.plane.normal.z < self.params.min_step_normal;
            if slanted {
                let slant = self.trace(self.origin, self.origin + trace.plane.normal);
                if slant.hit() && !slant.start_solid {
                    slanted = false;
                }
            }

            if !trace.hit() || (slanted && !trace.start_solid) {
                self.state.pm_flags.remove(PmFlags::ON_GROUND);
            } else {
                self.ground.entity = trace.entity;

                // solid ground ends a water jump
                if self.state.pm_flags.contains(PmFlags::TIME_WATERJUMP) {
                    self.state.pm_flags.remove(PmFlags::TIME_MASK);
                    self.state.pm_time = 0;
                }

                if !self.state.pm_flags.contains(PmFlags::ON_GROUND) {
                    self.land(trace.plane.normal);
                }
            }

            self.touches.register(&trace);
        }

        self.liquid = self.liquid_at(self.origin);
    }

    fn land(&mut self, normal: Vec3) {
        let clipped =
            clip_velocity(self.velocity, normal, IMPACT_OVERCLIP, self.params.stop_epsilon);
        let impact = clipped.z - self.start_velocity.z;
        self.report.impact_delta = impact;

        self.state.pm_flags.insert(PmFlags::ON_GROUND);
        self.report.outcomes.insert(MoveOutcome::Landed);
        if impact > self.params.hard_landing_delta {
            trace!(impact, "fell hard");
            self.report.outcomes.insert(MoveOutcome::FellHard);
        }

        if self.state.pm_flags.contains(PmFlags::DUCKED) {
            self.state.pm_flags.insert(PmFlags::TIME_LAND);
            self.state.pm_time = LAND_TIME_MSEC;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmove_core::{BoxWorld, Brush, EntityId, InputCommand, KinematicState, MoveParams};

    fn pool() -> BoxWorld {
        BoxWorld::new()
            .with(Brush::solid(
                Vec3::new(-512.0, -512.0, -64.0),
                Vec3::new(512.0, 512.0, 0.0),
            ))
            .with(Brush::volume(
                Vec3::new(-512.0, -512.0, 0.0),
                Vec3::new(512.0, 512.0, 128.0),
                ContentFlags::WATER,
            ))
    }

    fn ctx_at<'a>(
        world: &'a BoxWorld,
        params: &'a MoveParams,
        state: KinematicState,
    ) -> MoveContext<'a, BoxWorld> {
        MoveContext::new(world, params, InputCommand::new(1, 16), state)
    }

    #[test]
    fn test_liquid_levels() {
        let world = pool();
        let params = MoveParams::default();
        let ctx = ctx_at(&world, &params, KinematicState::at(Vec3::ZERO));

        // feet sample at z + mins.z + 1, waist at + 33, eyes at + 66
        let dry = ctx.liquid_at(Vec3::new(0.0, 0.0, 200.0));
        assert_eq!(dry.level, LiquidLevel::None);

        let feet = ctx.liquid_at(Vec3::new(0.0, 0.0, 140.0));
        assert_eq!(feet.level, LiquidLevel::Feet);
        assert!(feet.kind.contains(ContentFlags::WATER));

        let waist = ctx.liquid_at(Vec3::new(0.0, 0.0, 100.0));
        assert_eq!(waist.level, LiquidLevel::Waist);

        let under = ctx.liquid_at(Vec3::new(0.0, 0.0, 36.0));
        assert_eq!(under.level, LiquidLevel::Under);
    }

    #[test]
    fn test_grounded_on_floor() {
        let world = pool();
        let params = MoveParams::default();
        let mut ctx = ctx_at(&world, &params, KinematicState::at(Vec3::new(0.0, 0.0, 36.0)));

        ctx.categorize_position();

        assert_eq!(ctx.ground.entity, Some(EntityId::WORLD));
        assert_eq!(ctx.ground.plane.normal, Vec3::Z);
        assert!(ctx.state.pm_flags.contains(PmFlags::ON_GROUND));
        assert!(ctx.report.outcomes.contains(MoveOutcome::Landed));
        assert_eq!(ctx.touches.len(), 1);
    }

    #[test]
    fn test_fast_upward_motion_skips_ground() {
        let world = pool();
        let params = MoveParams::default();
        let mut state = KinematicState::at(Vec3::new(0.0, 0.0, 36.0))
            .with_velocity(Vec3::new(0.0, 0.0, 270.0));
        state.pm_flags.insert(PmFlags::ON_GROUND);
        let mut ctx = ctx_at(&world, &params, state);

        ctx.categorize_position();

        assert!(!ctx.is_grounded());
        assert!(!ctx.state.pm_flags.contains(PmFlags::ON_GROUND));
    }

    #[test]
    fn test_hard_landing_reports_impact() {
        let world = pool();
        let params = MoveParams::default();
        let state = KinematicState::at(Vec3::new(0.0, 0.0, 36.0))
            .with_velocity(Vec3::new(0.0, 0.0, -600.0));
        let mut ctx = ctx_at(&world, &params, state);

        ctx.categorize_position();

        // the ground clip bounces slightly, so the impact exceeds the fall speed
        assert!(ctx.report.impact_delta >= 600.0);
        assert!(ctx.report.impact_delta < 610.0);
        assert!(ctx.report.outcomes.contains(MoveOutcome::FellHard));
    }

    #[test]
    fn test_ducked_landing_sets_land_timer() {
        let world = pool();
        let params = MoveParams::default();
        let mut state = KinematicState::at(Vec3::new(0.0, 0.0, 36.0));
        state.pm_flags.insert(PmFlags::DUCKED);
        let mut ctx = ctx_at(&world, &params, state);

        ctx.categorize_position();

        assert!(ctx.state.pm_flags.contains(PmFlags::TIME_LAND));
        assert_eq!(ctx.state.pm_time, LAND_TIME_MSEC);
    }
}
