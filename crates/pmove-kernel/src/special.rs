//! Jumping, ladder detection, water jumps and movement timers.

use glam::Vec3;
use tracing::trace;

use pmove_core::{Buttons, ContentFlags, GeometryQuery, LiquidLevel, PmFlags, PmType};

use crate::context::MoveContext;
use crate::outcome::MoveOutcome;
use crate::slide::slide_move;
use crate::touch::TouchTraceList;

/// Water jump timer in milliseconds.
const WATERJUMP_TIME_MSEC: u16 = 2048;
/// Distance searched ahead for a ledge to climb out on.
const WATERJUMP_REACH: f32 = 40.0;
/// Horizontal and vertical speed of a water jump.
const WATERJUMP_FORWARD_SPEED: f32 = 50.0;
const WATERJUMP_UP_SPEED: f32 = 350.0;
/// Simulation step used to test a water jump.
const WATERJUMP_SIM_STEP: f32 = 0.1;

impl<G: GeometryQuery + ?Sized> MoveContext<'_, G> {
    /// Start a jump when jump is pressed on the ground.
    pub(crate) fn check_jump(&mut self) {
        // hasn't been long enough since landing
        if self.state.pm_flags.contains(PmFlags::TIME_LAND) {
            return;
        }

        if !self.cmd.buttons.contains(Buttons::JUMP) {
            self.state.pm_flags.remove(PmFlags::JUMP_HELD);
            return;
        }

        // must wait for jump to be released
        if self.state.pm_flags.contains(PmFlags::JUMP_HELD) {
            return;
        }

        if self.state.pm_type == PmType::Dead {
            return;
        }

        // swimming, not jumping
        if self.liquid.level >= LiquidLevel::Waist {
            self.clear_ground();
            return;
        }

        if !self.is_grounded() {
            return;
        }

        self.state.pm_flags.insert(PmFlags::JUMP_HELD);
        self.state.pm_flags.remove(PmFlags::ON_GROUND);
        self.clear_ground();
        self.report.outcomes.insert(MoveOutcome::Jumped);

        let jump = self.params.jump_speed;
        self.velocity.z = (self.velocity.z + jump).max(jump);
    }

    /// Detect ladders ahead and try a water jump out of the liquid.
    pub(crate) fn check_special_movement(&mut self) {
        if self.state.pm_time != 0 {
            return;
        }

        self.state.pm_flags.remove(PmFlags::ON_LADDER);

        let flat_forward =
            Vec3::new(self.axes.forward.x, self.axes.forward.y, 0.0).normalize_or_zero();

        let spot = self.origin + flat_forward;
        let trace = self.trace_mask(self.origin, spot, ContentFlags::LADDER);
        if trace.hit()
            && trace.contents.contains(ContentFlags::LADDER)
            && self.liquid.level < LiquidLevel::Waist
        {
            self.state.pm_flags.insert(PmFlags::ON_LADDER);
        }

        if self.params.gravity == 0.0 {
            return;
        }

        // don't try to hop out when moving away from the edge
        if !self.cmd.buttons.contains(Buttons::JUMP) && self.cmd.forward_move <= 0.0 {
            return;
        }

        if self.liquid.level != LiquidLevel::Waist {
            return;
        }

        // something must block us ahead
        let ahead = self.origin + flat_forward * WATERJUMP_REACH;
        let trace = self.trace_mask(self.origin, ahead, ContentFlags::MASK_SOLID);
        if !trace.hit() || trace.plane.normal.z >= self.params.min_step_normal {
            return;
        }

        let jump_velocity = Vec3::new(
            flat_forward.x * WATERJUMP_FORWARD_SPEED,
            flat_forward.y * WATERJUMP_FORWARD_SPEED,
            WATERJUMP_UP_SPEED,
        );
        if self.water_jump_lands(jump_velocity) {
            trace!(origin = ?self.origin, "water jump");
            self.velocity = jump_velocity;
            self.state.pm_flags.insert(PmFlags::TIME_WATERJUMP);
            self.state.pm_time = WATERJUMP_TIME_MSEC;
            self.report.outcomes.insert(MoveOutcome::WaterJumped);
        }
    }

    /// Simulate the jump and check it ends on dry, walkable ground.
    fn water_jump_lands(&self, jump_velocity: Vec3) -> bool {
        let gravity = self.params.gravity;
        let tracer = self.tracer();
        let mut origin = self.origin;
        let mut velocity = jump_velocity;
        let mut touches = TouchTraceList::new();
        let mut has_time = true;

        let steps = ((10.0 * (800.0 / gravity)) as i32).clamp(0, 50);
        for _ in 0..steps {
            velocity.z -= gravity * WATERJUMP_SIM_STEP;
            if velocity.z < 0.0 {
                has_time = false;
            }
            slide_move(
                tracer,
                self.params,
                &mut origin,
                &mut velocity,
                WATERJUMP_SIM_STEP,
                &mut touches,
                has_time,
            );
        }

        // snap down to ground
        let below = origin - Vec3::new(0.0, 0.0, 2.0);
        let trace = tracer.trace_mask(origin, below, ContentFlags::MASK_SOLID);
        if !trace.hit()
            || trace.plane.normal.z < self.params.min_step_normal
            || trace.end_pos.z < self.origin.z
        {
            return false;
        }

        // standing on ground and the target is a mere step
        if self.is_grounded() && (self.origin.z - trace.end_pos.z).abs() <= self.params.step_size {
            return false;
        }

        // still deep in liquid over there
        self.liquid_at(trace.end_pos).level < LiquidLevel::Waist
    }

    /// Count `pm_time` down, clearing the timer flags on expiry.
    pub(crate) fn drop_timers(&mut self) {
        if self.state.pm_time == 0 {
            return;
        }

        let msec = u16::from(self.cmd.msec);
        if msec >= self.state.pm_time {
            self.state.pm_flags.remove(PmFlags::TIME_MASK);
            self.state.pm_time = 0;
        } else {
            self.state.pm_time -= msec;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmove_core::{
        angle_vectors, BoxWorld, Brush, EntityId, InputCommand, KinematicState, LiquidInfo,
        MoveParams,
    };

    fn grounded_ctx<'a>(
        world: &'a BoxWorld,
        params: &'a MoveParams,
        cmd: InputCommand,
        state: KinematicState,
    ) -> MoveContext<'a, BoxWorld> {
        let mut ctx = MoveContext::new(world, params, cmd, state);
        ctx.ground.entity = Some(EntityId::WORLD);
        ctx
    }

    #[test]
    fn test_jump_from_ground() {
        let world = BoxWorld::new();
        let params = MoveParams::default();
        let cmd = InputCommand::new(1, 16).with_buttons(Buttons::JUMP);
        let mut ctx = grounded_ctx(&world, &params, cmd, KinematicState::at(Vec3::ZERO));

        ctx.check_jump();

        assert_eq!(ctx.velocity.z, params.jump_speed);
        assert!(ctx.report.jumped());
        assert!(!ctx.is_grounded());
        assert!(ctx.state.pm_flags.contains(PmFlags::JUMP_HELD));
    }

    #[test]
    fn test_held_jump_does_not_retrigger() {
        let world = BoxWorld::new();
        let params = MoveParams::default();
        let cmd = InputCommand::new(1, 16).with_buttons(Buttons::JUMP);
        let mut state = KinematicState::at(Vec3::ZERO);
        state.pm_flags.insert(PmFlags::JUMP_HELD);
        let mut ctx = grounded_ctx(&world, &params, cmd, state);

        ctx.check_jump();

        assert_eq!(ctx.velocity.z, 0.0);
        assert!(!ctx.report.jumped());
    }

    #[test]
    fn test_release_clears_jump_held() {
        let world = BoxWorld::new();
        let params = MoveParams::default();
        let mut state = KinematicState::at(Vec3::ZERO);
        state.pm_flags.insert(PmFlags::JUMP_HELD);
        let mut ctx = grounded_ctx(&world, &params, InputCommand::new(1, 16), state);

        ctx.check_jump();

        assert!(!ctx.state.pm_flags.contains(PmFlags::JUMP_HELD));
    }

    #[test]
    fn test_landing_timer_blocks_jump() {
        let world = BoxWorld::new();
        let params = MoveParams::default();
        let cmd = InputCommand::new(1, 16).with_buttons(Buttons::JUMP);
        let mut state = KinematicState::at(Vec3::ZERO);
        state.pm_flags.insert(PmFlags::TIME_LAND);
        state.pm_time = 128;
        let mut ctx = grounded_ctx(&world, &params, cmd, state);

        ctx.check_jump();

        assert!(!ctx.report.jumped());
    }

    #[test]
    fn test_swimming_does_not_jump() {
        let world = BoxWorld::new();
        let params = MoveParams::default();
        let cmd = InputCommand::new(1, 16).with_buttons(Buttons::JUMP);
        let mut ctx = grounded_ctx(&world, &params, cmd, KinematicState::at(Vec3::ZERO));
        ctx.liquid = LiquidInfo {
            kind: ContentFlags::WATER,
            level: LiquidLevel::Waist,
        };

        ctx.check_jump();

        assert!(!ctx.report.jumped());
        assert!(!ctx.is_grounded());
    }

    #[test]
    fn test_ladder_detected_ahead() {
        // ladder wall right in front, facing +x
        let world = BoxWorld::new().with(Brush::volume(
            Vec3::new(16.5, -64.0, -256.0),
            Vec3::new(32.0, 64.0, 256.0),
            ContentFlags::SOLID | ContentFlags::LADDER,
        ));
        let params = MoveParams::default();
        let mut ctx = MoveContext::new(
            &world,
            &params,
            InputCommand::new(1, 16),
            KinematicState::at(Vec3::ZERO),
        );
        ctx.axes = angle_vectors(Vec3::ZERO);

        ctx.check_special_movement();
        assert!(ctx.state.pm_flags.contains(PmFlags::ON_LADDER));

        // facing away finds nothing
        ctx.axes = angle_vectors(Vec3::new(0.0, 180.0, 0.0));
        ctx.check_special_movement();
        assert!(!ctx.state.pm_flags.contains(PmFlags::ON_LADDER));
    }

    /// Waist-deep pool against a ledge whose top is at z = 64.
    fn pool_with_ledge() -> BoxWorld {
        BoxWorld::new()
            .with(Brush::solid(
                Vec3::new(-512.0, -512.0, -64.0),
                Vec3::new(512.0, 512.0, 0.0),
            ))
            .with(Brush::volume(
                Vec3::new(-512.0, -512.0, 0.0),
                Vec3::new(24.0, 512.0, 60.0),
                ContentFlags::WATER,
            ))
            .with(Brush::solid(
                Vec3::new(24.0, -512.0, 0.0),
                Vec3::new(512.0, 512.0, 64.0),
            ))
    }

    fn waist_deep_ctx<'a>(world: &'a BoxWorld, params: &'a MoveParams) -> MoveContext<'a, BoxWorld> {
        let cmd = InputCommand::new(1, 16).with_move(300.0, 0.0, 0.0);
        let mut ctx = MoveContext::new(world, params, cmd, KinematicState::at(Vec3::new(0.0, 0.0, 50.0)));
        ctx.axes = angle_vectors(Vec3::ZERO);
        ctx.liquid = LiquidInfo {
            kind: ContentFlags::WATER,
            level: LiquidLevel::Waist,
        };
        ctx
    }

    #[test]
    fn test_water_jump_onto_ledge() {
        let world = pool_with_ledge();
        let params = MoveParams::default();
        let mut ctx = waist_deep_ctx(&world, &params);

        ctx.check_special_movement();

        assert!(ctx.report.outcomes.contains(MoveOutcome::WaterJumped));
        assert!(ctx.state.pm_flags.contains(PmFlags::TIME_WATERJUMP));
        assert_eq!(ctx.state.pm_time, WATERJUMP_TIME_MSEC);
        assert_eq!(ctx.velocity, Vec3::new(WATERJUMP_FORWARD_SPEED, 0.0, WATERJUMP_UP_SPEED));
    }

    #[test]
    fn test_no_water_jump_without_input() {
        let world = pool_with_ledge();
        let params = MoveParams::default();
        let mut ctx = waist_deep_ctx(&world, &params);
        ctx.cmd.forward_move = 0.0;

        ctx.check_special_movement();

        assert!(!ctx.report.outcomes.contains(MoveOutcome::WaterJumped));
        assert_eq!(ctx.state.pm_time, 0);
        assert_eq!(ctx.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_no_water_jump_onto_high_wall() {
        // the wall rises far above anything a jump can reach
        let world = BoxWorld::new()
            .with(Brush::volume(
                Vec3::new(-512.0, -512.0, 0.0),
                Vec3::new(24.0, 512.0, 60.0),
                ContentFlags::WATER,
            ))
            .with(Brush::solid(
                Vec3::new(24.0, -512.0, -64.0),
                Vec3::new(512.0, 512.0, 512.0),
            ));
        let params = MoveParams::default();
        let mut ctx = waist_deep_ctx(&world, &params);

        ctx.check_special_movement();

        assert!(!ctx.report.outcomes.contains(MoveOutcome::WaterJumped));
        assert!(!ctx.state.pm_flags.contains(PmFlags::TIME_WATERJUMP));
    }

    #[test]
    fn test_timer_expiry_clears_flags() {
        let world = BoxWorld::new();
        let params = MoveParams::default();
        let mut state = KinematicState::at(Vec3::ZERO);
        state.pm_flags.insert(PmFlags::TIME_LAND);
        state.pm_time = 20;
        let mut ctx = MoveContext::new(&world, &params, InputCommand::new(1, 16), state);

        ctx.drop_timers();
        assert_eq!(ctx.state.pm_time, 4);
        assert!(ctx.state.pm_flags.contains(PmFlags::TIME_LAND));

        ctx.drop_timers();
        assert_eq!(ctx.state.pm_time, 0);
        assert!(!ctx.state.pm_flags.intersects(PmFlags::TIME_MASK));
    }
}
