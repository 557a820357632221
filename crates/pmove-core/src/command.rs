//! Per-tick player input.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::flags::Buttons;
use crate::time::Frame;

/// One tick of player input, identical on client and server.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputCommand {
    /// Frame this command belongs to
    pub frame: Frame,
    /// Duration of the tick in milliseconds
    pub msec: u8,
    pub buttons: Buttons,
    /// View angles `(pitch, yaw, roll)` in degrees, before delta angles
    pub angles: Vec3,
    pub forward_move: f32,
    pub side_move: f32,
    pub up_move: f32,
    pub impulse: u8,
}

impl InputCommand {
    /// Create an empty command for `frame` lasting `msec`
    pub fn new(frame: Frame, msec: u8) -> Self {
        Self {
            frame,
            msec,
            ..Self::default()
        }
    }

    /// A command with no movement input that keeps the previous view angles
    ///
    /// Used by the server when a client sent nothing for a tick.
    pub fn zero_input(frame: Frame, msec: u8, angles: Vec3) -> Self {
        Self {
            angles,
            ..Self::new(frame, msec)
        }
    }

    /// Set forward/side/up movement
    pub fn with_move(mut self, forward: f32, side: f32, up: f32) -> Self {
        self.forward_move = forward;
        self.side_move = side;
        self.up_move = up;
        self
    }

    /// Set view angles
    pub fn with_angles(mut self, angles: Vec3) -> Self {
        self.angles = angles;
        self
    }

    /// Set buttons
    pub fn with_buttons(mut self, buttons: Buttons) -> Self {
        self.buttons = buttons;
        self
    }

    /// Clear movement input and the jump/crouch buttons
    pub fn erase_movement(&mut self) {
        self.forward_move = 0.0;
        self.side_move = 0.0;
        self.up_move = 0.0;
        self.buttons.remove(Buttons::JUMP | Buttons::CROUCH);
    }

    /// Check if the command advances time at all
    pub fn has_time(&self) -> bool {
        self.msec > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_input_keeps_angles() {
        let angles = Vec3::new(10.0, 45.0, 0.0);
        let cmd = InputCommand::zero_input(12, 25, angles);

        assert_eq!(cmd.frame, 12);
        assert_eq!(cmd.msec, 25);
        assert_eq!(cmd.angles, angles);
        assert_eq!(cmd.forward_move, 0.0);
        assert!(cmd.buttons.is_empty());
    }

    #[test]
    fn test_erase_movement() {
        let mut cmd = InputCommand::new(1, 16)
            .with_move(300.0, -200.0, 100.0)
            .with_buttons(Buttons::JUMP | Buttons::ATTACK);

        cmd.erase_movement();

        assert_eq!(cmd.forward_move, 0.0);
        assert_eq!(cmd.side_move, 0.0);
        assert_eq!(cmd.buttons, Buttons::ATTACK);
    }
}
