//! Client-side prediction
//!
//! Replays the movement kernel over every recorded command newer than the
//! last authoritative baseline. Works with any `CommandHistory` for command
//! storage; the default is the bounded `CommandRingBuffer`.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pmove_command_buffer::CommandRingBuffer;
use pmove_core::{
    CommandHistory, ContentFlags, EntityId, Frame, GeometryQuery, GroundInfo, InputCommand,
    KinematicState, LiquidInfo, MoveParams, PmType,
};
use pmove_kernel::{player_move, MoveContext};

use crate::config::PredictionConfig;
use crate::reconciliation::compare;
use crate::step_smoothing::{StepSmoother, ViewHeightTransition};
use crate::{Error, Result};

/// Last authoritative state received for this player.
///
/// Replaced wholesale whenever a newer snapshot arrives.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionBaseline {
    /// Command frame the state is the result of
    pub frame: Frame,
    pub state: KinematicState,
    pub ground: GroundInfo,
    pub liquid: LiquidInfo,
}

impl PredictionBaseline {
    /// A baseline without ground or liquid information.
    pub fn new(frame: Frame, state: KinematicState) -> Self {
        Self {
            frame,
            state,
            ..Self::default()
        }
    }

    /// Hash over the exact bit pattern of the state.
    pub fn checksum(&self) -> Result<u64> {
        compare::state_checksum(&self.state)
    }
}

/// Output of one prediction pass, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedFrame {
    /// Newest command frame included
    pub frame: Frame,
    pub state: KinematicState,
    pub ground: GroundInfo,
    pub liquid: LiquidInfo,
    pub view_angles: Vec3,
    pub view_contents: ContentFlags,
    /// The last replayed move clipped a stair while going up
    pub step_clip: bool,
    /// Kernel invocations this pass
    pub replayed: usize,
    /// The backlog was truncated, the result may be off
    pub degraded: bool,
}

/// Client-side predictor
///
/// Holds the command history, the latest baseline and the origin predicted
/// for each command frame, which reconciliation compares against the server.
///
/// Generic over `H: CommandHistory` to allow different storage backends.
pub struct Predictor<H: CommandHistory = CommandRingBuffer> {
    params: MoveParams,
    pub(crate) config: PredictionConfig,
    commands: H,
    /// Predicted origin per frame, indexed like the command history
    origins: Vec<Option<(Frame, Vec3)>>,
    skip: Option<EntityId>,
    pub(crate) baseline: Option<PredictionBaseline>,
    pub(crate) last: Option<PredictedFrame>,
    /// Origin error of the last reconciliation, decayed by the renderer
    pub(crate) error: Vec3,
    pub(crate) step: StepSmoother,
    pub(crate) view: ViewHeightTransition,
}

impl Predictor<CommandRingBuffer> {
    /// Create a predictor backed by a default `CommandRingBuffer`.
    pub fn new(params: MoveParams, config: PredictionConfig) -> Self {
        Self::with_history(CommandRingBuffer::default(), params, config)
    }
}

impl<H: CommandHistory> Predictor<H> {
    /// Create a predictor over the given command history
    pub fn with_history(history: H, params: MoveParams, config: PredictionConfig) -> Self {
        let slots = history.capacity().max(1);
        let step = StepSmoother::new(&config);
        Self {
            params,
            config,
            commands: history,
            origins: vec![None; slots],
            skip: None,
            baseline: None,
            last: None,
            error: Vec3::ZERO,
            step,
            view: ViewHeightTransition::default(),
        }
    }

    /// Entity the kernel traces ignore, usually the local player.
    pub fn skip_entity(mut self, entity: EntityId) -> Self {
        self.skip = Some(entity);
        self
    }

    /// Record a command sent to the server this tick.
    pub fn record_command(&mut self, cmd: InputCommand) {
        self.commands.record(cmd);
    }

    /// Predict forward from the baseline over every newer command.
    ///
    /// Fails with `NoBaseline` before the first snapshot and with
    /// `OutOfWindow` when commands since the baseline have been overwritten,
    /// which requires a fresh baseline from the server.
    pub fn predict<G: GeometryQuery + ?Sized>(
        &mut self,
        world: &G,
        now_ms: u64,
    ) -> Result<PredictedFrame> {
        let baseline = self.baseline.clone().ok_or(Error::NoBaseline)?;

        let mut predicted = PredictedFrame {
            frame: baseline.frame,
            state: baseline.state,
            ground: baseline.ground.clone(),
            liquid: baseline.liquid,
            view_angles: self.last.as_ref().map_or(Vec3::ZERO, |p| p.view_angles),
            view_contents: self
                .last
                .as_ref()
                .map_or(ContentFlags::EMPTY, |p| p.view_contents),
            step_clip: false,
            replayed: 0,
            degraded: false,
        };

        let newest = self
            .commands
            .newest_frame()
            .filter(|&newest| newest > baseline.frame);

        if let Some(newest) = newest {
            let mut from = baseline.frame + 1;
            if let Err(err) = self.commands.check_window(from) {
                warn!(%err, baseline = baseline.frame, "prediction needs a resync");
                return Err(err.into());
            }

            let backlog = newest - baseline.frame;
            let budget = self.config.max_replay() as Frame;
            if backlog > budget {
                warn!(backlog, budget, "prediction backlog truncated");
                from = newest + 1 - budget;
                predicted.degraded = true;
            }

            for cmd in self.commands.replay_range(from, newest)? {
                // stored but never simulated
                if cmd.has_time() {
                    let ctx = MoveContext::new(world, &self.params, cmd, predicted.state);
                    let ctx = match self.skip {
                        Some(entity) => ctx.skip_entity(entity),
                        None => ctx,
                    };
                    let result = player_move(ctx);

                    predicted.state = result.state;
                    predicted.ground = result.ground;
                    predicted.liquid = result.liquid;
                    predicted.view_angles = result.view_angles;
                    predicted.view_contents = result.view_contents;
                    predicted.step_clip = result.report.step_clip;
                    predicted.replayed += 1;
                }
                self.store_origin(cmd.frame, predicted.state.origin);
            }
            predicted.frame = newest;
        }

        self.detect_step(&baseline, &predicted, now_ms);
        self.view.update(predicted.state.view_height, now_ms);

        debug!(
            frame = predicted.frame,
            replayed = predicted.replayed,
            degraded = predicted.degraded,
            "predicted"
        );

        self.last = Some(predicted.clone());
        Ok(predicted)
    }

    /// Start step smoothing when the prediction moved onto a new surface
    /// by a stair-sized amount.
    fn detect_step(&mut self, baseline: &PredictionBaseline, predicted: &PredictedFrame, now_ms: u64) {
        let (old_z, old_ground) = match &self.last {
            Some(last) => (last.state.origin.z, &last.ground),
            None => (baseline.state.origin.z, &baseline.ground),
        };
        let step = predicted.state.origin.z - old_z;

        let started_grounded = baseline.state.is_on_ground() || predicted.step_clip;
        let still_grounded =
            predicted.state.is_on_ground() && predicted.state.pm_type == PmType::Normal;
        let new_surface =
            old_ground.plane != predicted.ground.plane || old_ground.entity != predicted.ground.entity;

        if self.config.is_step_size(step) && started_grounded && still_grounded && new_surface {
            debug!(step, "step smoothing");
            self.step.start(step, now_ms);
        }
    }

    fn slot(&self, frame: Frame) -> usize {
        (frame % self.origins.len() as Frame) as usize
    }

    fn store_origin(&mut self, frame: Frame, origin: Vec3) {
        let slot = self.slot(frame);
        self.origins[slot] = Some((frame, origin));
    }

    /// Origin predicted for `frame`, if it is still remembered.
    pub fn predicted_origin(&self, frame: Frame) -> Option<Vec3> {
        self.origins[self.slot(frame)]
            .filter(|(f, _)| *f == frame)
            .map(|(_, origin)| origin)
    }

    /// Vertical offset the renderer subtracts to smooth the last step.
    pub fn step_offset(&self, now_ms: u64) -> f32 {
        self.step.offset(now_ms)
    }

    /// Previous and current eye heights.
    pub fn view_height(&self) -> &ViewHeightTransition {
        &self.view
    }

    /// Get the current baseline
    pub fn baseline(&self) -> Option<&PredictionBaseline> {
        self.baseline.as_ref()
    }

    /// Get the result of the last prediction pass
    pub fn last_prediction(&self) -> Option<&PredictedFrame> {
        self.last.as_ref()
    }

    /// Number of frames the newest command is ahead of the baseline
    pub fn prediction_frames(&self) -> Frame {
        match (self.commands.newest_frame(), &self.baseline) {
            (Some(newest), Some(baseline)) => newest.saturating_sub(baseline.frame),
            _ => 0,
        }
    }

    pub fn params(&self) -> &MoveParams {
        &self.params
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Get access to the command history
    pub fn commands(&self) -> &H {
        &self.commands
    }

    /// Forget commands, baseline and smoothing state
    pub fn reset(&mut self) {
        self.commands.clear();
        self.origins.iter_mut().for_each(|slot| *slot = None);
        self.baseline = None;
        self.last = None;
        self.error = Vec3::ZERO;
        self.step.reset(0);
        self.view = ViewHeightTransition::default();
    }
}
