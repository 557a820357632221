//! Friction and acceleration.

use glam::Vec3;

use pmove_core::{GeometryQuery, PmFlags, SurfaceFlags};

use crate::context::MoveContext;

/// Scale `velocity` down by `drop`, never below zero.
fn apply_drop(velocity: Vec3, speed: f32, drop: f32) -> Vec3 {
    let new_speed = (speed - drop).max(0.0);
    velocity * (new_speed / speed)
}

impl<G: GeometryQuery + ?Sized> MoveContext<'_, G> {
    /// Ground and water friction.
    pub(crate) fn friction(&mut self) {
        let speed = self.velocity.length();
        if speed < 1.0 {
            self.velocity.x = 0.0;
            self.velocity.y = 0.0;
            return;
        }

        let on_ladder = self.state.pm_flags.contains(PmFlags::ON_LADDER);
        let mut drop = 0.0;

        let slick = self.ground.surface.flags.contains(SurfaceFlags::SLICK);
        if (self.is_grounded() && !slick) || on_ladder {
            let control = speed.max(self.params.stop_speed);
            drop += control * self.params.friction * self.frametime;
        }

        if self.liquid.level.depth() > 0.0 && !on_ladder {
            drop += speed * self.params.water_friction * self.liquid.level.depth() * self.frametime;
        }

        self.velocity = apply_drop(self.velocity, speed, drop);
    }

    /// Flying friction, applied everywhere.
    pub(crate) fn fly_friction(&mut self) {
        let speed = self.velocity.length();
        if speed < 1.0 {
            self.velocity = Vec3::ZERO;
            return;
        }

        let control = speed.max(self.params.stop_speed);
        let drop = control * self.params.fly_friction * self.frametime;
        self.velocity = apply_drop(self.velocity, speed, drop);
    }

    /// Accelerate toward `wish_dir` up to `wish_speed`.
    pub(crate) fn accelerate(&mut self, wish_dir: Vec3, wish_speed: f32, accel: f32) {
        let current = self.velocity.dot(wish_dir);
        let add = wish_speed - current;
        if add <= 0.0 {
            return;
        }

        let accel_speed = (accel * self.frametime * wish_speed).min(add);
        self.velocity += wish_dir * accel_speed;
    }

    /// Airborne acceleration.
    ///
    /// The speed gained along `wish_dir` is limited to `air_wish_cap`, while
    /// the acceleration rate still scales with the full wish speed.
    pub(crate) fn air_accelerate(&mut self, wish_dir: Vec3, wish_speed: f32, accel: f32) {
        let capped = wish_speed.min(self.params.air_wish_cap);
        let current = self.velocity.dot(wish_dir);
        let add = capped - current;
        if add <= 0.0 {
            return;
        }

        let accel_speed = (accel * wish_speed * self.frametime).min(add);
        self.velocity += wish_dir * accel_speed;
    }
}
