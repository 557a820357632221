//! Slide and step-slide collision resolution.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use pmove_core::{math::horizontal_distance_squared, GeometryQuery, LiquidLevel, MoveParams};
use pmove_core::{Buttons, PmFlags};

use crate::context::{MoveContext, Tracer};
use crate::outcome::MoveOutcome;
use crate::touch::TouchTraceList;

bitflags::bitflags! {
    /// Which kinds of planes a slide move clipped against.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ClipFlags: u8 {
        /// A plane steep enough to stand on
        const FLOOR = 1 << 0;
        /// A wall, step face or slope too steep to stand on
        const WALL = 1 << 1;
    }
}

impl ClipFlags {
    /// Classify a contact plane by its normal.
    ///
    /// Ceilings facing mostly down are neither floor nor wall.
    pub fn classify(normal: Vec3, min_step_normal: f32) -> Self {
        if normal.z >= min_step_normal {
            Self::FLOOR
        } else if normal.z > -min_step_normal {
            Self::WALL
        } else {
            Self::empty()
        }
    }
}

/// Remove the component of `velocity` going into `normal`.
///
/// `overbounce` slightly above 1 pushes the result off the plane. Components
/// within `stop_epsilon` of zero snap to zero.
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32, stop_epsilon: f32) -> Vec3 {
    let backoff = velocity.dot(normal) * overbounce;
    let mut out = velocity - normal * backoff;
    for i in 0..3 {
        if out[i] > -stop_epsilon && out[i] < stop_epsilon {
            out[i] = 0.0;
        }
    }
    out
}

/// Summary of one slide move.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct SlideResult {
    pub clipped: ClipFlags,
    /// Velocity was stopped by the plane set
    pub blocked: bool,
    /// Stuck in solid or out of clip planes
    pub trapped: bool,
}

/// Move `origin` along `velocity` for `frametime`, sliding along contacts.
///
/// When `has_time` is set the original velocity is restored afterwards so
/// timed moves (water jumps) keep their momentum.
pub(crate) fn slide_move<G: GeometryQuery + ?Sized>(
    tracer: Tracer<'_, G>,
    params: &MoveParams,
    origin: &mut Vec3,
    velocity: &mut Vec3,
    frametime: f32,
    touches: &mut TouchTraceList,
    has_time: bool,
) -> SlideResult {
    let max_planes = params.max_clip_planes;
    let mut planes: Vec<Vec3> = Vec::with_capacity(max_planes);
    let primal_velocity = *velocity;
    let mut time_left = frametime;
    let mut result = SlideResult::default();

    for _ in 0..max_planes {
        let end = *origin + *velocity * time_left;
        let trace = tracer.trace(*origin, end);

        if trace.all_solid {
            // no falling damage build-up while stuck
            velocity.z = 0.0;
            touches.register(&trace);
            result.trapped = true;
            return result;
        }

        if trace.fraction > 0.0 {
            *origin = trace.end_pos;
            planes.clear();
        }

        if trace.fraction >= 1.0 {
            break;
        }

        touches.register(&trace);
        time_left -= time_left * trace.fraction;

        if planes.len() >= max_planes {
            *velocity = Vec3::ZERO;
            result.trapped = true;
            break;
        }
        planes.push(trace.plane.normal);
        result.clipped |= ClipFlags::classify(trace.plane.normal, params.min_step_normal);

        // find a plane the clipped velocity doesn't re-enter any other plane of
        let mut found = false;
        for (i, plane) in planes.iter().enumerate() {
            *velocity = clip_velocity(*velocity, *plane, params.overclip, params.stop_epsilon);

            let enters_other = planes
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && velocity.dot(*other) < 0.0);
            if !enters_other {
                found = true;
                break;
            }
        }

        if !found {
            if planes.len() != 2 {
                *velocity = Vec3::ZERO;
                result.blocked = true;
                break;
            }
            // slide along the crease
            let dir = planes[0].cross(planes[1]);
            *velocity = dir * dir.dot(*velocity);
        }

        // never turn back against the original direction
        if velocity.dot(primal_velocity) <= 0.0 {
            *velocity = Vec3::ZERO;
            result.blocked = true;
            break;
        }
    }

    if has_time {
        *velocity = primal_velocity;
    }

    result
}

impl<G: GeometryQuery + ?Sized> MoveContext<'_, G> {
    fn slide(&mut self) -> SlideResult {
        let tracer = self.tracer();
        slide_move(
            tracer,
            self.params,
            &mut self.origin,
            &mut self.velocity,
            self.frametime,
            &mut self.touches,
            self.state.pm_time != 0,
        )
    }

    /// Slide move that also tries stepping over obstacles up to `step_size`.
    ///
    /// Keeps whichever of the direct and raised paths went farther
    /// horizontally, then snaps down onto stairs and slopes while grounded.
    pub(crate) fn step_slide_move(&mut self) {
        let step_size = self.params.step_size;
        let start_origin = self.origin;
        let start_velocity = self.velocity;

        let direct = self.slide();
        let down_origin = self.origin;
        let down_velocity = self.velocity;

        let mut outcome = direct;
        let mut stepped = false;

        let up = start_origin + Vec3::new(0.0, 0.0, step_size);
        let up_trace = self.trace(start_origin, up);
        if !up_trace.all_solid {
            let step_up = up_trace.end_pos.z - start_origin.z;

            // try sliding from the raised position
            self.origin = up_trace.end_pos;
            self.velocity = start_velocity;
            let raised = self.slide();

            // push down the final amount, starting the probe no higher than
            // the start origin so a step lip cannot catch the box
            let original_down = self.origin - Vec3::new(0.0, 0.0, step_up);
            let mut down = original_down;
            if start_origin.z < down.z {
                down.z = start_origin.z - 1.0;
            }

            let down_trace = self.trace(self.origin, down);
            if !down_trace.all_solid {
                let real_trace = self.trace(self.origin, original_down);
                self.origin = real_trace.end_pos;

                // only an upwards move is a stair clip
                if self.velocity.z > 0.0 {
                    self.report.step_clip = true;
                }
            }

            let down_dist = horizontal_distance_squared(down_origin, start_origin);
            let up_dist = horizontal_distance_squared(self.origin, start_origin);

            if down_dist > up_dist || down_trace.plane.normal.z < self.params.min_step_normal {
                self.origin = down_origin;
                self.velocity = down_velocity;
            } else {
                // walking along a plane keeps the direct vertical speed
                self.velocity.z = down_velocity.z;
                outcome = raised;
                stepped = true;
            }
        }

        // step down stairs and slopes
        if self.state.pm_flags.contains(PmFlags::ON_GROUND)
            && !self.state.pm_flags.contains(PmFlags::ON_LADDER)
            && (self.liquid.level < LiquidLevel::Waist
                || (!self.cmd.buttons.contains(Buttons::JUMP) && self.velocity.z <= 0.0))
        {
            let down = self.origin - Vec3::new(0.0, 0.0, step_size);
            let trace = self.trace(self.origin, down);
            if trace.hit() {
                if self.origin.z - trace.end_pos.z > 0.0 {
                    stepped = true;
                }
                self.origin = trace.end_pos;
            }
        }

        let step_height = self.origin.z - start_origin.z;
        self.report.step_height = step_height;
        self.report.clipped |= outcome.clipped;

        if stepped && step_height.abs() >= self.params.step_min_size {
            trace!(step_height, "stepped");
            self.report.outcomes.insert(MoveOutcome::Stepped);
        }
        if outcome.blocked {
            self.report.outcomes.insert(MoveOutcome::Blocked);
        }
        if outcome.trapped {
            trace!(origin = ?self.origin, "trapped");
            self.report.outcomes.insert(MoveOutcome::Trapped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmove_core::{BoxWorld, Brush, ContentFlags, InputCommand, KinematicState};

    #[test]
    fn test_clip_parallel_velocity_unchanged() {
        let v = Vec3::new(120.0, -35.0, 0.0);
        assert_eq!(clip_velocity(v, Vec3::Z, 1.001, 0.1), v);
    }

    #[test]
    fn test_clip_removes_into_plane_component() {
        let v = Vec3::new(100.0, 0.0, 0.0);
        let out = clip_velocity(v, Vec3::NEG_X, 1.001, 0.1);
        // overbounce pushes slightly off the wall
        assert!(out.x <= 0.0);
        assert!(out.x.abs() < 0.2);
    }

    #[test]
    fn test_clip_snaps_small_components() {
        let v = Vec3::new(0.05, 10.0, -0.05);
        assert_eq!(clip_velocity(v, Vec3::Z, 1.0, 0.1), Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_classify_uses_min_step_normal() {
        let min = MoveParams::default().min_step_normal;

        assert_eq!(ClipFlags::classify(Vec3::Z, min), ClipFlags::FLOOR);
        assert_eq!(ClipFlags::classify(Vec3::new(0.6, 0.0, 0.8), min), ClipFlags::FLOOR);
        assert_eq!(ClipFlags::classify(Vec3::NEG_X, min), ClipFlags::WALL);
        // a 70 degree slope is too steep to stand on
        assert_eq!(ClipFlags::classify(Vec3::new(0.94, 0.0, 0.34), min), ClipFlags::WALL);
        assert_eq!(ClipFlags::classify(Vec3::NEG_Z, min), ClipFlags::empty());
    }

    #[test]
    fn test_slide_along_wall_does_not_penetrate() {
        // wall face at x = 64
        let world = BoxWorld::new().with(Brush::solid(
            Vec3::new(64.0, -512.0, -512.0),
            Vec3::new(128.0, 512.0, 512.0),
        ));
        let params = MoveParams::default();
        let state = KinematicState::at(Vec3::new(40.0, 0.0, 0.0))
            .with_velocity(Vec3::new(300.0, 300.0, 0.0));
        let mut ctx = MoveContext::new(&world, &params, InputCommand::new(1, 100), state);

        let result = ctx.slide();

        assert_eq!(result.clipped, ClipFlags::WALL);
        assert!(ctx.origin.x <= 64.0 - 16.0);
        assert!(ctx.origin.y > 20.0, "slid along the wall: {:?}", ctx.origin);
        assert!(ctx.velocity.x.abs() < 0.5);

        // one more micro-step along the clipped velocity stays out of the wall
        let end = ctx.origin + ctx.velocity * 0.001;
        let retrace = ctx.trace(ctx.origin, end);
        assert!(!retrace.start_solid);
        assert!(retrace.end_pos.x <= 64.0 - 16.0);
    }

    #[test]
    fn test_report_carries_clip_kinds() {
        let world = BoxWorld::new()
            .with(Brush::solid(
                Vec3::new(-512.0, -512.0, -64.0),
                Vec3::new(512.0, 512.0, 0.0),
            ))
            .with(Brush::solid(
                Vec3::new(64.0, -512.0, 0.0),
                Vec3::new(128.0, 512.0, 512.0),
            ));
        let params = MoveParams::default();

        // falling onto the floor
        let state = KinematicState::at(Vec3::new(0.0, 0.0, 40.0))
            .with_velocity(Vec3::new(0.0, 0.0, -300.0));
        let mut ctx = MoveContext::new(&world, &params, InputCommand::new(1, 100), state);
        ctx.step_slide_move();
        assert_eq!(ctx.report.clipped, ClipFlags::FLOOR);

        // running into the wall, too tall to step over
        let state = KinematicState::at(Vec3::new(40.0, 0.0, 36.0))
            .with_velocity(Vec3::new(300.0, 100.0, 0.0));
        let mut ctx = MoveContext::new(&world, &params, InputCommand::new(1, 100), state);
        ctx.step_slide_move();
        assert!(ctx.report.clipped.contains(ClipFlags::WALL));
        assert!(!ctx.report.stepped());
    }

    #[test]
    fn test_slide_in_solid_is_trapped() {
        let world = BoxWorld::new().with(Brush::volume(
            Vec3::splat(-100.0),
            Vec3::splat(100.0),
            ContentFlags::SOLID,
        ));
        let params = MoveParams::default();
        let state = KinematicState::at(Vec3::ZERO).with_velocity(Vec3::new(10.0, 0.0, -50.0));
        let mut ctx = MoveContext::new(&world, &params, InputCommand::new(1, 16), state);

        let result = ctx.slide();

        assert!(result.trapped);
        assert_eq!(ctx.velocity.z, 0.0);
        assert_eq!(ctx.origin, Vec3::ZERO);
    }

    #[test]
    fn test_slide_into_corner_is_blocked() {
        // two walls meeting at a corner in front of the player
        let world = BoxWorld::new()
            .with(Brush::solid(
                Vec3::new(32.0, -512.0, -512.0),
                Vec3::new(64.0, 512.0, 512.0),
            ))
            .with(Brush::solid(
                Vec3::new(-512.0, 32.0, -512.0),
                Vec3::new(512.0, 64.0, 512.0),
            ));
        let params = MoveParams::default();
        let state = KinematicState::at(Vec3::ZERO).with_velocity(Vec3::new(200.0, 200.0, 0.0));
        let mut ctx = MoveContext::new(&world, &params, InputCommand::new(1, 100), state);

        let result = ctx.slide();

        assert!(result.blocked);
        assert_eq!(ctx.velocity, Vec3::ZERO);
        assert!(ctx.origin.x <= 16.0 && ctx.origin.y <= 16.0);
    }
}
