//! Structured results of a movement tick.

use serde::{Deserialize, Serialize};

use crate::slide::ClipFlags;

/// Something that happened during a movement tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The origin changed
    Moved,
    /// A stair step was climbed or descended
    Stepped,
    /// A plane stopped the velocity dead
    Blocked,
    /// Stuck in solid or out of clip planes, velocity zeroed
    Trapped,
    /// A jump was triggered
    Jumped,
    /// A water jump was triggered
    WaterJumped,
    /// Ground was touched after being airborne
    Landed,
    /// Landed with an impact above the hard landing threshold
    FellHard,
}

impl MoveOutcome {
    const ALL: [MoveOutcome; 8] = [
        MoveOutcome::Moved,
        MoveOutcome::Stepped,
        MoveOutcome::Blocked,
        MoveOutcome::Trapped,
        MoveOutcome::Jumped,
        MoveOutcome::WaterJumped,
        MoveOutcome::Landed,
        MoveOutcome::FellHard,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// A small set of `MoveOutcome`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MoveOutcomes(u16);

impl MoveOutcomes {
    /// The empty set.
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, outcome: MoveOutcome) {
        self.0 |= outcome.bit();
    }

    pub fn contains(&self, outcome: MoveOutcome) -> bool {
        self.0 & outcome.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate the outcomes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = MoveOutcome> + '_ {
        MoveOutcome::ALL
            .into_iter()
            .filter(move |outcome| self.contains(*outcome))
    }
}

impl FromIterator<MoveOutcome> for MoveOutcomes {
    fn from_iter<I: IntoIterator<Item = MoveOutcome>>(iter: I) -> Self {
        let mut set = Self::new();
        for outcome in iter {
            set.insert(outcome);
        }
        set
    }
}

/// Side effects reported by a movement tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoveReport {
    pub outcomes: MoveOutcomes,
    /// Vertical change caused by stepping, for view smoothing
    pub step_height: f32,
    /// The raised step path finished while moving upward
    pub step_clip: bool,
    /// Kinds of planes the chosen slide path clipped against
    pub clipped: ClipFlags,
    /// Vertical speed lost on landing, for fall damage and sounds
    pub impact_delta: f32,
}

impl MoveReport {
    pub fn jumped(&self) -> bool {
        self.outcomes.contains(MoveOutcome::Jumped)
    }

    pub fn stepped(&self) -> bool {
        self.outcomes.contains(MoveOutcome::Stepped)
    }

    pub fn fell_hard(&self) -> bool {
        self.outcomes.contains(MoveOutcome::FellHard)
    }

    pub fn trapped(&self) -> bool {
        self.outcomes.contains(MoveOutcome::Trapped)
    }
}
