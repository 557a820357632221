//! Trace results returned by the geometry provider.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::flags::{ContentFlags, SurfaceFlags};

/// Identity of a collidable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// The static world.
    pub const WORLD: Self = Self(0);

    /// Check if this is the static world.
    pub fn is_world(self) -> bool {
        self == Self::WORLD
    }
}

/// Opaque material handle attached to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// A collision plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal pointing out of the solid.
    pub normal: Vec3,
    /// Distance from the origin along `normal`.
    pub dist: f32,
}

impl Plane {
    pub fn new(normal: Vec3, dist: f32) -> Self {
        Self { normal, dist }
    }
}

/// A touched surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Surface {
    pub name: String,
    pub flags: SurfaceFlags,
    pub value: i32,
    pub material: Option<MaterialId>,
}

/// Result of sweeping a box through the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// Portion of the sweep completed, `1.0` when nothing was hit.
    pub fraction: f32,
    /// Final box position.
    pub end_pos: Vec3,
    /// Plane that stopped the sweep.
    pub plane: Plane,
    /// Surface that stopped the sweep.
    pub surface: Surface,
    /// Contents of what was hit.
    pub contents: ContentFlags,
    /// The whole sweep was inside a solid.
    pub all_solid: bool,
    /// The sweep started inside a solid.
    pub start_solid: bool,
    /// Entity that was hit, `None` when nothing was.
    pub entity: Option<EntityId>,
}

impl TraceResult {
    /// A sweep that reached `end_pos` untouched.
    pub fn clear(end_pos: Vec3) -> Self {
        Self {
            fraction: 1.0,
            end_pos,
            plane: Plane::default(),
            surface: Surface::default(),
            contents: ContentFlags::EMPTY,
            all_solid: false,
            start_solid: false,
            entity: None,
        }
    }

    /// Check if the sweep hit anything before its end.
    #[inline]
    pub fn hit(&self) -> bool {
        self.fraction < 1.0
    }
}

impl Default for TraceResult {
    fn default() -> Self {
        Self::clear(Vec3::ZERO)
    }
}
