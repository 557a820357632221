//! Entities touched during a movement tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use pmove_core::{EntityId, Plane, TraceResult};

/// Maximum number of touched entities reported per tick.
pub const MAX_TOUCH_TRACES: usize = 32;

/// One touched entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchTrace {
    pub entity: EntityId,
    pub normal: Vec3,
    pub plane: Plane,
}

/// Bounded, de-duplicated list of touched entities.
///
/// The first 32 distinct entities win; later contacts are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchTraceList {
    traces: Vec<TouchTrace>,
}

impl TouchTraceList {
    pub fn new() -> Self {
        Self {
            traces: Vec::with_capacity(MAX_TOUCH_TRACES),
        }
    }

    /// Register the entity a trace ran into.
    ///
    /// Returns `true` when it was added. Traces that hit nothing, duplicates
    /// and overflow are ignored.
    pub fn register(&mut self, trace: &TraceResult) -> bool {
        let Some(entity) = trace.entity else {
            return false;
        };
        if self.traces.len() >= MAX_TOUCH_TRACES || self.contains(entity) {
            return false;
        }
        self.traces.push(TouchTrace {
            entity,
            normal: trace.plane.normal,
            plane: trace.plane,
        });
        true
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.traces.iter().any(|t| t.entity == entity)
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TouchTrace> {
        self.traces.iter()
    }

    pub fn clear(&mut self) {
        self.traces.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(entity: u32) -> TraceResult {
        TraceResult {
            fraction: 0.5,
            entity: Some(EntityId(entity)),
            plane: Plane::new(Vec3::Z, 0.0),
            ..TraceResult::default()
        }
    }

    #[test]
    fn test_register_dedupes() {
        let mut list = TouchTraceList::new();
        assert!(list.register(&hit(1)));
        assert!(!list.register(&hit(1)));
        assert!(list.register(&hit(2)));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_register_ignores_misses() {
        let mut list = TouchTraceList::new();
        assert!(!list.register(&TraceResult::default()));
        assert!(list.is_empty());
    }

    #[test]
    fn test_capacity_first_wins() {
        let mut list = TouchTraceList::new();
        for entity in 0..100 {
            list.register(&hit(entity));
        }
        assert_eq!(list.len(), MAX_TOUCH_TRACES);
        assert!(list.contains(EntityId(0)));
        assert!(list.contains(EntityId(31)));
        assert!(!list.contains(EntityId(32)));
    }
}
