//! The geometry query capability the movement kernel is given.
//!
//! The kernel never knows how collision is resolved; it only issues box
//! sweeps and point samples through this trait. Implementations must be
//! deterministic, side-effect free, and bounded in time.

use glam::Vec3;

use crate::flags::ContentFlags;
use crate::trace::{EntityId, TraceResult};

/// Collision queries against the world.
pub trait GeometryQuery {
    /// Sweep the box `mins..maxs` from `start` to `end` against everything
    /// matching `mask`, ignoring `skip`.
    fn trace(
        &self,
        start: Vec3,
        mins: Vec3,
        maxs: Vec3,
        end: Vec3,
        skip: Option<EntityId>,
        mask: ContentFlags,
    ) -> TraceResult;

    /// Same as `trace`, but against world geometry only.
    fn clip(&self, start: Vec3, mins: Vec3, maxs: Vec3, end: Vec3, mask: ContentFlags)
        -> TraceResult;

    /// Contents of every volume containing `point`.
    fn point_contents(&self, point: Vec3) -> ContentFlags;
}

impl<T: GeometryQuery + ?Sized> GeometryQuery for &T {
    fn trace(
        &self,
        start: Vec3,
        mins: Vec3,
        maxs: Vec3,
        end: Vec3,
        skip: Option<EntityId>,
        mask: ContentFlags,
    ) -> TraceResult {
        (**self).trace(start, mins, maxs, end, skip, mask)
    }

    fn clip(
        &self,
        start: Vec3,
        mins: Vec3,
        maxs: Vec3,
        end: Vec3,
        mask: ContentFlags,
    ) -> TraceResult {
        (**self).clip(start, mins, maxs, end, mask)
    }

    fn point_contents(&self, point: Vec3) -> ContentFlags {
        (**self).point_contents(point)
    }
}
