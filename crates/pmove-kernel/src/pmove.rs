//! The `player_move` entry point.

use glam::Vec3;
use tracing::trace;

use pmove_core::{
    angle_vectors,
    math::{angle_mod, PITCH, YAW},
    GeometryQuery, LiquidLevel, PmFlags, PmType,
};

use crate::context::{MoveContext, MoveResult};
use crate::outcome::MoveOutcome;

/// Run one tick of player movement.
///
/// Deterministic for a fixed command, state, parameter set and world. The
/// returned state fully replaces the input state.
///
/// # Example
///
/// ```
/// use pmove_core::{BoxWorld, Brush, InputCommand, KinematicState, MoveParams, Vec3};
/// use pmove_kernel::{player_move, MoveContext};
///
/// let world = BoxWorld::new().with(Brush::solid(
///     Vec3::new(-512.0, -512.0, -16.0),
///     Vec3::new(512.0, 512.0, 0.0),
/// ));
/// let params = MoveParams::default();
/// let cmd = InputCommand::new(1, 16).with_move(300.0, 0.0, 0.0);
/// let state = KinematicState::at(Vec3::new(0.0, 0.0, 36.0));
///
/// let result = player_move(MoveContext::new(&world, &params, cmd, state));
/// assert!(result.state.origin.x > 0.0);
/// assert!(result.ground.is_grounded());
/// ```
pub fn player_move<G: GeometryQuery + ?Sized>(mut ctx: MoveContext<'_, G>) -> MoveResult {
    let start_origin = ctx.origin;

    ctx.clamp_angles();

    if ctx.state.pm_type.is_flying() {
        ctx.state.pm_flags = PmFlags::NONE;
        ctx.set_dimensions();
        ctx.ease_view_height();
        ctx.fly_move(ctx.state.pm_type == PmType::Spectator);
        ctx.update_view_contents();
        ctx.snap_position();
        return ctx.complete(start_origin);
    }

    if ctx.state.pm_type.is_lifeless() {
        ctx.cmd.erase_movement();
    }

    if ctx.state.pm_type == PmType::Freeze {
        return ctx.finish();
    }

    ctx.set_dimensions();
    ctx.categorize_position();

    if ctx.snap_initial {
        ctx.initial_snap_position();
    }

    if ctx.check_duck() {
        ctx.categorize_position();
    }
    ctx.ease_view_height();

    if ctx.state.pm_type == PmType::Dead {
        ctx.dead_move();
    }

    ctx.check_special_movement();
    ctx.drop_timers();

    if ctx.state.pm_flags.contains(PmFlags::TIME_TELEPORT) {
        // teleport pause stays exactly in place
    } else if ctx.state.pm_flags.contains(PmFlags::TIME_WATERJUMP) {
        // no control, only gravity until falling again
        ctx.velocity.z -= ctx.params.gravity * ctx.frametime;
        if ctx.velocity.z < 0.0 {
            ctx.state.pm_flags.remove(PmFlags::TIME_MASK);
            ctx.state.pm_time = 0;
        }
        ctx.step_slide_move();
    } else {
        ctx.check_jump();
        ctx.friction();

        if ctx.liquid.level >= LiquidLevel::Waist {
            ctx.water_move();
        } else {
            // flatten the pitch for walking
            let mut angles = ctx.view_angles;
            if angles[PITCH] > 180.0 {
                angles[PITCH] -= 360.0;
            }
            angles[PITCH] /= 3.0;
            ctx.axes = angle_vectors(angles);

            ctx.air_move();
        }
    }

    ctx.categorize_position();
    ctx.update_view_contents();
    ctx.snap_position();
    ctx.complete(start_origin)
}

impl<G: GeometryQuery + ?Sized> MoveContext<'_, G> {
    /// Combine command and delta angles into clamped view angles.
    fn clamp_angles(&mut self) {
        let cmd_angles = self.cmd.angles;
        let delta = self.state.delta_angles;

        if self.state.pm_flags.contains(PmFlags::TIME_TELEPORT) {
            self.view_angles = Vec3::new(0.0, angle_mod(cmd_angles[YAW] + delta[YAW]), 0.0);
        } else {
            let mut angles = Vec3::new(
                angle_mod(cmd_angles.x + delta.x),
                angle_mod(cmd_angles.y + delta.y),
                angle_mod(cmd_angles.z + delta.z),
            );
            // don't look up or down more than 90 degrees
            if angles[PITCH] > 89.0 && angles[PITCH] < 180.0 {
                angles[PITCH] = 89.0;
            } else if angles[PITCH] < 271.0 && angles[PITCH] >= 180.0 {
                angles[PITCH] = 271.0;
            }
            self.view_angles = angles;
        }

        self.axes = angle_vectors(self.view_angles);
    }

    /// Contents at the eye position.
    fn update_view_contents(&mut self) {
        let eye = self.origin + Vec3::new(0.0, 0.0, self.state.view_height);
        self.view_contents = self.geometry.point_contents(eye);
    }

    fn complete(mut self, start_origin: Vec3) -> MoveResult {
        if self.state.origin != start_origin {
            self.report.outcomes.insert(MoveOutcome::Moved);
        }
        trace!(
            frame = self.cmd.frame,
            origin = ?self.state.origin,
            velocity = ?self.state.velocity,
            outcomes = ?self.report.outcomes,
            "player move"
        );
        self.finish()
    }
}
