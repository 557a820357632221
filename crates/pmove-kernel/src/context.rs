//! Per-invocation movement context
//!
//! A `MoveContext` is built fresh for each kernel call and consumed by
//! [`player_move`](crate::player_move). It holds the inputs, the scratch
//! locals the stages share, and the outputs collected along the way.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use pmove_core::{
    angle_vectors,
    time::msec_to_seconds,
    Axes, ContentFlags, EntityId, GeometryQuery, GroundInfo, InputCommand, KinematicState,
    LiquidInfo, MoveParams, PmType, TraceResult,
};

use crate::outcome::MoveReport;
use crate::touch::TouchTraceList;

/// Traces with the mask rules of the current movement type.
///
/// Copyable so stages can trace while mutably borrowing other parts of the
/// context.
pub(crate) struct Tracer<'a, G: GeometryQuery + ?Sized> {
    geometry: &'a G,
    pub mins: Vec3,
    pub maxs: Vec3,
    pm_type: PmType,
    skip: Option<EntityId>,
}

impl<G: GeometryQuery + ?Sized> Clone for Tracer<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: GeometryQuery + ?Sized> Copy for Tracer<'_, G> {}

impl<'a, G: GeometryQuery + ?Sized> Tracer<'a, G> {
    /// Sweep the player box with the default mask.
    pub fn trace(&self, start: Vec3, end: Vec3) -> TraceResult {
        self.trace_mask(start, end, ContentFlags::EMPTY)
    }

    /// Sweep the player box, an empty `mask` selects the default.
    ///
    /// Spectators always clip against world geometry only.
    pub fn trace_mask(&self, start: Vec3, end: Vec3, mask: ContentFlags) -> TraceResult {
        if self.pm_type == PmType::Spectator {
            return self
                .geometry
                .clip(start, self.mins, self.maxs, end, ContentFlags::MASK_SOLID);
        }

        let mask = if !mask.is_empty() {
            mask
        } else {
            match self.pm_type {
                PmType::Dead | PmType::Gib => ContentFlags::MASK_DEAD_SOLID,
                _ => ContentFlags::MASK_PLAYER_SOLID,
            }
        };
        self.geometry
            .trace(start, self.mins, self.maxs, end, self.skip, mask)
    }

    /// Same tracer with a different box.
    pub fn with_bounds(mut self, mins: Vec3, maxs: Vec3) -> Self {
        self.mins = mins;
        self.maxs = maxs;
        self
    }
}

/// Everything one `player_move` call reads, writes and shares between stages.
pub struct MoveContext<'a, G: GeometryQuery + ?Sized> {
    pub(crate) geometry: &'a G,
    pub(crate) params: &'a MoveParams,
    pub(crate) cmd: InputCommand,
    pub(crate) state: KinematicState,
    pub(crate) skip: Option<EntityId>,
    pub(crate) snap_initial: bool,

    // outputs
    pub(crate) mins: Vec3,
    pub(crate) maxs: Vec3,
    pub(crate) ground: GroundInfo,
    pub(crate) liquid: LiquidInfo,
    pub(crate) touches: TouchTraceList,
    pub(crate) report: MoveReport,
    pub(crate) view_angles: Vec3,
    pub(crate) view_contents: ContentFlags,

    // locals
    pub(crate) origin: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) start_velocity: Vec3,
    pub(crate) previous_origin: Vec3,
    pub(crate) axes: Axes,
    pub(crate) frametime: f32,
}

impl<'a, G: GeometryQuery + ?Sized> MoveContext<'a, G> {
    /// Create a context for one tick.
    pub fn new(
        geometry: &'a G,
        params: &'a MoveParams,
        cmd: InputCommand,
        state: KinematicState,
    ) -> Self {
        let bounds = state.bounds();
        Self {
            geometry,
            params,
            cmd,
            state,
            skip: None,
            snap_initial: false,
            mins: bounds.mins,
            maxs: bounds.maxs,
            ground: GroundInfo::default(),
            liquid: LiquidInfo::default(),
            touches: TouchTraceList::new(),
            report: MoveReport::default(),
            view_angles: Vec3::ZERO,
            view_contents: ContentFlags::EMPTY,
            origin: state.origin,
            velocity: state.velocity,
            start_velocity: state.velocity,
            previous_origin: state.origin,
            axes: angle_vectors(Vec3::ZERO),
            frametime: msec_to_seconds(cmd.msec),
        }
    }

    /// Entity the traces ignore, usually the moving player itself.
    pub fn skip_entity(mut self, entity: EntityId) -> Self {
        self.skip = Some(entity);
        self
    }

    /// Search for a valid position near the origin before moving.
    ///
    /// Hosts request this after placing the player from outside the kernel.
    pub fn snap_initial(mut self) -> Self {
        self.snap_initial = true;
        self
    }

    pub fn command(&self) -> &InputCommand {
        &self.cmd
    }

    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    pub(crate) fn tracer(&self) -> Tracer<'a, G> {
        Tracer {
            geometry: self.geometry,
            mins: self.mins,
            maxs: self.maxs,
            pm_type: self.state.pm_type,
            skip: self.skip,
        }
    }

    pub(crate) fn trace(&self, start: Vec3, end: Vec3) -> TraceResult {
        self.tracer().trace(start, end)
    }

    pub(crate) fn trace_mask(&self, start: Vec3, end: Vec3, mask: ContentFlags) -> TraceResult {
        self.tracer().trace_mask(start, end, mask)
    }

    pub(crate) fn is_grounded(&self) -> bool {
        self.ground.is_grounded()
    }

    pub(crate) fn clear_ground(&mut self) {
        self.ground.entity = None;
    }

    /// Package the outputs.
    pub(crate) fn finish(self) -> MoveResult {
        MoveResult {
            state: self.state,
            ground: self.ground,
            liquid: self.liquid,
            touches: self.touches,
            report: self.report,
            mins: self.mins,
            maxs: self.maxs,
            view_angles: self.view_angles,
            view_contents: self.view_contents,
        }
    }
}

/// Result of one kernel invocation.
///
/// `state` is a complete replacement for the input state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveResult {
    pub state: KinematicState,
    pub ground: GroundInfo,
    pub liquid: LiquidInfo,
    pub touches: TouchTraceList,
    pub report: MoveReport,
    /// Collision box used this tick
    pub mins: Vec3,
    pub maxs: Vec3,
    /// Clamped view angles
    pub view_angles: Vec3,
    /// Contents at the eye position
    pub view_contents: ContentFlags,
}

impl MoveResult {
    pub fn is_underwater_view(&self) -> bool {
        self.view_contents.intersects(ContentFlags::MASK_WATER)
    }
}
