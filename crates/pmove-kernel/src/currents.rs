//! Ladder climbing and world currents.

use glam::Vec3;

use pmove_core::{math::PITCH, Buttons, ContentFlags, GeometryQuery, LiquidLevel, PmFlags};

use crate::context::MoveContext;

/// Unit direction encoded by the six current content bits.
pub fn current_direction(contents: ContentFlags) -> Vec3 {
    let mut dir = Vec3::ZERO;
    if contents.contains(ContentFlags::CURRENT_0) {
        dir.x += 1.0;
    }
    if contents.contains(ContentFlags::CURRENT_90) {
        dir.y += 1.0;
    }
    if contents.contains(ContentFlags::CURRENT_180) {
        dir.x -= 1.0;
    }
    if contents.contains(ContentFlags::CURRENT_270) {
        dir.y -= 1.0;
    }
    if contents.contains(ContentFlags::CURRENT_UP) {
        dir.z += 1.0;
    }
    if contents.contains(ContentFlags::CURRENT_DOWN) {
        dir.z -= 1.0;
    }
    dir
}

impl<G: GeometryQuery + ?Sized> MoveContext<'_, G> {
    /// Blend ladder climbing, water currents and conveyors into `wish_vel`.
    pub(crate) fn add_currents(&self, wish_vel: &mut Vec3) {
        if self.state.pm_flags.contains(PmFlags::ON_LADDER) {
            self.ladder_wish(wish_vel);
        }

        // water currents
        if self.liquid.kind.intersects(ContentFlags::MASK_CURRENT) {
            let mut speed = self.params.water_speed;
            if self.liquid.level == LiquidLevel::Feet && self.is_grounded() {
                speed /= 2.0;
            }
            *wish_vel += current_direction(self.liquid.kind) * speed;
        }

        // conveyor belts
        if self.is_grounded() {
            *wish_vel += current_direction(self.ground.contents) * self.params.conveyor_speed;
        }
    }

    fn ladder_wish(&self, wish_vel: &mut Vec3) {
        let cmd = &self.cmd;
        let climb = cmd.buttons.contains(Buttons::JUMP) || cmd.up_move > 0.0;
        let descend = cmd.buttons.contains(Buttons::CROUCH) || cmd.up_move < 0.0;

        if climb || descend {
            // full speed when swimming up a ladder
            let speed = if self.liquid.level >= LiquidLevel::Waist {
                self.params.max_speed
            } else {
                self.params.ladder_speed
            };
            wish_vel.z = if climb { speed } else { -speed };
        } else if cmd.forward_move != 0.0 {
            let speed = cmd
                .forward_move
                .clamp(-self.params.ladder_speed, self.params.ladder_speed);
            let pitch = self.view_angles[PITCH];
            if cmd.forward_move > 0.0 {
                if (271.0..345.0).contains(&pitch) {
                    wish_vel.z = speed;
                } else if (15.0..271.0).contains(&pitch) {
                    wish_vel.z = -speed;
                }
            } else {
                // backing down before touching ground must not slide off
                if !self.is_grounded() {
                    wish_vel.x = 0.0;
                    wish_vel.y = 0.0;
                }
                wish_vel.z = speed;
            }
        } else {
            wish_vel.z = 0.0;
        }

        if self.is_grounded() {
            return;
        }

        if cmd.side_move != 0.0 {
            // strafe perpendicular to the ladder plane
            let side = self.params.ladder_side_speed;
            let mut speed = cmd.side_move.clamp(-side, side);
            if self.liquid.level < LiquidLevel::Waist {
                speed *= self.params.ladder_mod;
            }

            let flat_forward = Vec3::new(self.axes.forward.x, self.axes.forward.y, 0.0)
                .normalize_or_zero();
            let spot = self.origin + flat_forward;
            let trace = self.trace_mask(self.origin, spot, ContentFlags::LADDER);
            if trace.hit() && trace.contents.contains(ContentFlags::LADDER) {
                let right = trace.plane.normal.cross(Vec3::Z);
                wish_vel.x = 0.0;
                wish_vel.y = 0.0;
                *wish_vel += right * -speed;
            }
        } else {
            wish_vel.x = wish_vel.x.clamp(-25.0, 25.0);
            wish_vel.y = wish_vel.y.clamp(-25.0, 25.0);
        }
    }
}
