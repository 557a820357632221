//! Movement modes: walking and falling, swimming, flying and dead bodies.

use glam::Vec3;

use pmove_core::{math::normalize_with_length, Buttons, GeometryQuery, PmFlags};

use crate::context::MoveContext;

/// Downward wish speed of an idle swimmer.
const WATER_SINK_SPEED: f32 = 60.0;
/// Speed lost per tick by a dead body on the ground.
const DEAD_FRICTION: f32 = 20.0;

/// Scale `wish_vel` down so its length does not exceed `max`.
fn clamp_wish(wish_vel: &mut Vec3, wish_speed: &mut f32, max: f32) {
    if *wish_speed > max {
        *wish_vel *= max / *wish_speed;
        *wish_speed = max;
    }
}

impl<G: GeometryQuery + ?Sized> MoveContext<'_, G> {
    /// Ground, ladder and air movement.
    pub(crate) fn air_move(&mut self) {
        let fmove = self.cmd.forward_move;
        let smove = self.cmd.side_move;

        // walk speed must not depend on pitch
        let forward = self.axes.forward.with_z(0.0).normalize_or_zero();
        let right = self.axes.right.with_z(0.0).normalize_or_zero();

        let mut wish_vel = forward * fmove + right * smove;
        self.add_currents(&mut wish_vel);

        let (wish_dir, mut wish_speed) = normalize_with_length(wish_vel);
        let max_speed = if self.state.pm_flags.contains(PmFlags::DUCKED) {
            self.params.duck_speed
        } else {
            self.params.max_speed
        };
        clamp_wish(&mut wish_vel, &mut wish_speed, max_speed);

        let gravity = self.params.gravity;
        if self.state.pm_flags.contains(PmFlags::ON_LADDER) {
            self.accelerate(wish_dir, wish_speed, self.params.accelerate);
            if wish_vel.z == 0.0 {
                // settle vertical speed toward zero on the ladder
                if self.velocity.z > 0.0 {
                    self.velocity.z = (self.velocity.z - gravity * self.frametime).max(0.0);
                } else {
                    self.velocity.z = (self.velocity.z + gravity * self.frametime).min(0.0);
                }
            }
            self.step_slide_move();
        } else if self.is_grounded() {
            self.velocity.z = 0.0;
            self.accelerate(wish_dir, wish_speed, self.params.accelerate);

            if gravity > 0.0 {
                self.velocity.z = 0.0;
            } else {
                self.velocity.z -= gravity * self.frametime;
            }

            if self.velocity.x == 0.0 && self.velocity.y == 0.0 {
                return;
            }
            self.step_slide_move();
        } else {
            if self.params.air_accelerate > 0.0 {
                self.air_accelerate(wish_dir, wish_speed, self.params.air_accelerate);
            } else {
                self.accelerate(wish_dir, wish_speed, 1.0);
            }

            self.velocity.z -= gravity * self.frametime;
            self.step_slide_move();
        }
    }

    /// Swimming.
    pub(crate) fn water_move(&mut self) {
        let cmd = self.cmd;
        let half = self.params.water_speed * 0.5;

        let mut wish_vel = self.axes.forward * cmd.forward_move + self.axes.right * cmd.side_move;
        let vertical_input = cmd.buttons.intersects(Buttons::JUMP | Buttons::CROUCH);
        if cmd.forward_move == 0.0 && cmd.side_move == 0.0 && !vertical_input {
            if !self.is_grounded() {
                // drift towards the bottom
                wish_vel.z -= WATER_SINK_SPEED;
            }
        } else if cmd.buttons.contains(Buttons::CROUCH) {
            wish_vel.z -= half;
        } else if cmd.buttons.contains(Buttons::JUMP) {
            wish_vel.z += half;
        }

        self.add_currents(&mut wish_vel);

        let (wish_dir, mut wish_speed) = normalize_with_length(wish_vel);
        clamp_wish(&mut wish_vel, &mut wish_speed, self.params.max_speed);
        wish_speed *= 0.5;

        if self.state.pm_flags.contains(PmFlags::DUCKED) {
            clamp_wish(&mut wish_vel, &mut wish_speed, self.params.duck_speed);
        }

        self.accelerate(wish_dir, wish_speed, self.params.water_accelerate);
        self.step_slide_move();
    }

    /// Free flight for spectators and noclip.
    ///
    /// Spectators collide with world geometry, noclip passes through it.
    pub(crate) fn fly_move(&mut self, clip: bool) {
        self.fly_friction();

        let cmd = self.cmd;
        let forward = self.axes.forward.normalize_or_zero();
        let right = self.axes.right.normalize_or_zero();
        let half = self.params.water_speed * 0.5;

        let mut wish_vel = forward * cmd.forward_move + right * cmd.side_move;
        if cmd.buttons.contains(Buttons::JUMP) {
            wish_vel.z += half;
        }
        if cmd.buttons.contains(Buttons::CROUCH) {
            wish_vel.z -= half;
        }

        let (wish_dir, mut wish_speed) = normalize_with_length(wish_vel);
        clamp_wish(&mut wish_vel, &mut wish_speed, self.params.fly_speed);
        wish_speed *= 2.0;

        self.accelerate(wish_dir, wish_speed, self.params.fly_accelerate);

        if clip {
            self.step_slide_move();
        } else {
            self.origin += self.velocity * self.frametime;
        }
    }

    /// Extra friction for a dead body on the ground.
    pub(crate) fn dead_move(&mut self) {
        if !self.is_grounded() {
            return;
        }

        let (dir, speed) = normalize_with_length(self.velocity);
        let speed = speed - DEAD_FRICTION;
        self.velocity = if speed <= 0.0 { Vec3::ZERO } else { dir * speed };
    }
}
