//! Server authority loop
//!
//! The server owns the real state of each player. Commands arrive from the
//! client into a `CommandHistory`; every server tick consumes exactly the
//! next frame, runs the kernel once and publishes the result as the new
//! baseline for that client.

use glam::Vec3;
use tracing::{debug, trace};

use pmove_command_buffer::CommandRingBuffer;
use pmove_core::{
    CommandHistory, EntityId, Frame, FrameRate, GeometryQuery, GroundInfo, InputCommand,
    KinematicState, LiquidInfo, MoveParams,
};
use pmove_kernel::{player_move, MoveContext, MoveResult};

use crate::prediction::PredictionBaseline;

/// Authoritative movement of one player
pub struct ServerAuthority<H: CommandHistory = CommandRingBuffer> {
    params: MoveParams,
    commands: H,
    frame_rate: FrameRate,
    skip: Option<EntityId>,
    /// Last frame consumed
    frame: Frame,
    state: KinematicState,
    ground: GroundInfo,
    liquid: LiquidInfo,
    /// View angles of the last command, reused for missing ones
    last_angles: Vec3,
    last_result: Option<MoveResult>,
}

impl ServerAuthority<CommandRingBuffer> {
    /// Create an authority backed by a default `CommandRingBuffer`.
    pub fn new(params: MoveParams, frame_rate: FrameRate, frame: Frame, state: KinematicState) -> Self {
        Self::with_history(CommandRingBuffer::default(), params, frame_rate, frame, state)
    }
}

impl<H: CommandHistory> ServerAuthority<H> {
    /// Create an authority whose state is the result of `frame`.
    pub fn with_history(
        history: H,
        params: MoveParams,
        frame_rate: FrameRate,
        frame: Frame,
        state: KinematicState,
    ) -> Self {
        Self {
            params,
            commands: history,
            frame_rate,
            skip: None,
            frame,
            state,
            ground: GroundInfo::default(),
            liquid: LiquidInfo::default(),
            last_angles: Vec3::ZERO,
            last_result: None,
        }
    }

    /// Entity the kernel traces ignore, usually the player's own entity.
    pub fn skip_entity(mut self, entity: EntityId) -> Self {
        self.skip = Some(entity);
        self
    }

    /// Queue a command received from the client.
    ///
    /// Returns `false` for frames already consumed.
    pub fn queue_command(&mut self, cmd: InputCommand) -> bool {
        if cmd.frame <= self.frame {
            trace!(frame = cmd.frame, consumed = self.frame, "late command dropped");
            return false;
        }
        self.commands.record(cmd);
        true
    }

    /// Advance one frame and publish the new baseline.
    ///
    /// A frame the client sent nothing for continues with zero input,
    /// keeping the previous view angles.
    pub fn tick<G: GeometryQuery + ?Sized>(&mut self, world: &G) -> PredictionBaseline {
        let frame = self.frame + 1;
        let cmd = match self.commands.get(frame) {
            Some(cmd) => *cmd,
            None => {
                debug!(frame, "no command from client, continuing with zero input");
                InputCommand::zero_input(frame, self.frame_rate.frame_msec(), self.last_angles)
            }
        };

        if cmd.has_time() {
            let ctx = MoveContext::new(world, &self.params, cmd, self.state);
            let ctx = match self.skip {
                Some(entity) => ctx.skip_entity(entity),
                None => ctx,
            };
            let result = player_move(ctx);

            self.state = result.state;
            self.ground = result.ground.clone();
            self.liquid = result.liquid;
            self.last_result = Some(result);
        }

        self.frame = frame;
        self.last_angles = cmd.angles;
        self.baseline()
    }

    /// Current authoritative state, tagged with the last consumed frame.
    pub fn baseline(&self) -> PredictionBaseline {
        PredictionBaseline {
            frame: self.frame,
            state: self.state,
            ground: self.ground.clone(),
            liquid: self.liquid,
        }
    }

    /// Last consumed frame
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    /// Full kernel output of the last simulated frame, for trigger handling.
    pub fn last_result(&self) -> Option<&MoveResult> {
        self.last_result.as_ref()
    }

    pub fn params(&self) -> &MoveParams {
        &self.params
    }
}
