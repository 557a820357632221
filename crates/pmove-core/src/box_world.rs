//! Axis-aligned brush world.
//!
//! A small `GeometryQuery` implementation made of boxes, each with its own
//! contents, surface and owning entity. It sweeps boxes with the classic
//! expanded-plane brush clip, which is enough for floors, stairs, walls,
//! ladders and liquid volumes.

use glam::Vec3;

use crate::flags::{ContentFlags, SurfaceFlags};
use crate::geometry::GeometryQuery;
use crate::trace::{EntityId, Plane, Surface, TraceResult};

/// Distance traces stop short of a surface.
pub const DIST_EPSILON: f32 = 0.03125;

/// One axis-aligned box in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    pub mins: Vec3,
    pub maxs: Vec3,
    pub contents: ContentFlags,
    pub surface: Surface,
    pub entity: EntityId,
}

impl Brush {
    /// A world-owned solid box.
    pub fn solid(mins: Vec3, maxs: Vec3) -> Self {
        Self::volume(mins, maxs, ContentFlags::SOLID)
    }

    /// A world-owned box with the given contents.
    pub fn volume(mins: Vec3, maxs: Vec3, contents: ContentFlags) -> Self {
        Self {
            mins: mins.min(maxs),
            maxs: mins.max(maxs),
            contents,
            surface: Surface::default(),
            entity: EntityId::WORLD,
        }
    }

    /// Attach surface flags.
    pub fn with_surface_flags(mut self, flags: SurfaceFlags) -> Self {
        self.surface.flags = flags;
        self
    }

    /// Attach a named surface.
    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    /// Hand the brush to an entity other than the world.
    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = entity;
        self
    }

    /// The six bounding planes, outward facing.
    fn planes(&self) -> [Plane; 6] {
        [
            Plane::new(Vec3::X, self.maxs.x),
            Plane::new(Vec3::NEG_X, -self.mins.x),
            Plane::new(Vec3::Y, self.maxs.y),
            Plane::new(Vec3::NEG_Y, -self.mins.y),
            Plane::new(Vec3::Z, self.maxs.z),
            Plane::new(Vec3::NEG_Z, -self.mins.z),
        ]
    }

    fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.mins).all() && point.cmple(self.maxs).all()
    }

    /// Clip a box sweep against this brush, narrowing `trace` on a nearer hit.
    fn clip_sweep(&self, start: Vec3, end: Vec3, mins: Vec3, maxs: Vec3, trace: &mut TraceResult) {
        let mut enter_frac = -1.0f32;
        let mut leave_frac = 1.0f32;
        let mut lead = None;
        let mut start_out = false;
        let mut get_out = false;

        for plane in self.planes() {
            let n = plane.normal;
            let offset = Vec3::new(
                if n.x < 0.0 { maxs.x } else { mins.x },
                if n.y < 0.0 { maxs.y } else { mins.y },
                if n.z < 0.0 { maxs.z } else { mins.z },
            );
            let dist = plane.dist - offset.dot(n);
            let d1 = start.dot(n) - dist;
            let d2 = end.dot(n) - dist;

            if d2 > 0.0 {
                get_out = true;
            }
            if d1 >= 0.0 {
                start_out = true;
            }

            // completely in front of this face
            if d1 > 0.0 && d2 >= d1 {
                return;
            }
            // resting exactly on a face still blocks motion into it
            if d1 < 0.0 && d2 <= 0.0 {
                continue;
            }

            if d1 > d2 {
                let f = ((d1 - DIST_EPSILON) / (d1 - d2)).max(0.0);
                if f > enter_frac {
                    enter_frac = f;
                    lead = Some(plane);
                }
            } else {
                let f = ((d1 + DIST_EPSILON) / (d1 - d2)).min(1.0);
                if f < leave_frac {
                    leave_frac = f;
                }
            }
        }

        if !start_out {
            trace.start_solid = true;
            trace.entity = Some(self.entity);
            trace.contents = self.contents;
            if !get_out {
                trace.all_solid = true;
                trace.fraction = 0.0;
            }
            return;
        }

        if enter_frac < leave_frac && enter_frac > -1.0 && enter_frac < trace.fraction {
            if let Some(plane) = lead {
                trace.fraction = enter_frac.max(0.0);
                trace.plane = plane;
                trace.surface = self.surface.clone();
                trace.contents = self.contents;
                trace.entity = Some(self.entity);
            }
        }
    }
}

/// A world made of axis-aligned brushes.
#[derive(Debug, Clone, Default)]
pub struct BoxWorld {
    brushes: Vec<Brush>,
}

impl BoxWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a brush, returning its index.
    pub fn add(&mut self, brush: Brush) -> usize {
        self.brushes.push(brush);
        self.brushes.len() - 1
    }

    /// Builder form of `add`.
    pub fn with(mut self, brush: Brush) -> Self {
        self.add(brush);
        self
    }

    /// Number of brushes.
    pub fn len(&self) -> usize {
        self.brushes.len()
    }

    /// Check if the world has no brushes.
    pub fn is_empty(&self) -> bool {
        self.brushes.is_empty()
    }

    /// Access the brushes.
    pub fn brushes(&self) -> &[Brush] {
        &self.brushes
    }

    fn sweep<'a>(
        &self,
        brushes: impl Iterator<Item = &'a Brush>,
        start: Vec3,
        mins: Vec3,
        maxs: Vec3,
        end: Vec3,
    ) -> TraceResult {
        let mut trace = TraceResult::clear(end);

        for brush in brushes {
            brush.clip_sweep(start, end, mins, maxs, &mut trace);
            if trace.all_solid {
                break;
            }
        }

        trace.end_pos = if trace.fraction >= 1.0 {
            end
        } else {
            start + (end - start) * trace.fraction
        };
        trace
    }
}

impl GeometryQuery for BoxWorld {
    fn trace(
        &self,
        start: Vec3,
        mins: Vec3,
        maxs: Vec3,
        end: Vec3,
        skip: Option<EntityId>,
        mask: ContentFlags,
    ) -> TraceResult {
        let brushes = self
            .brushes
            .iter()
            .filter(|b| b.contents.intersects(mask) && Some(b.entity) != skip);
        self.sweep(brushes, start, mins, maxs, end)
    }

    fn clip(
        &self,
        start: Vec3,
        mins: Vec3,
        maxs: Vec3,
        end: Vec3,
        mask: ContentFlags,
    ) -> TraceResult {
        let brushes = self
            .brushes
            .iter()
            .filter(|b| b.contents.intersects(mask) && b.entity.is_world());
        self.sweep(brushes, start, mins, maxs, end)
    }

    fn point_contents(&self, point: Vec3) -> ContentFlags {
        self.brushes
            .iter()
            .filter(|b| b.contains_point(point))
            .fold(ContentFlags::EMPTY, |acc, b| acc | b.contents)
    }
}
