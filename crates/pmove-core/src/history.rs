//! Command history trait for storing and replaying recorded input commands
//!
//! This trait is used by:
//! - `pmove-netcode` for prediction replay and the server authority loop
//! - `pmove-command-buffer` for the bounded ring buffer implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use pmove_core::{CommandHistory, InputCommand};
//!
//! fn replay<H: CommandHistory>(history: &H, acknowledged: u64, current: u64) {
//!     for cmd in history.replay_range(acknowledged + 1, current)? {
//!         // run the movement kernel
//!     }
//! }
//! ```

use crate::{Error, Frame, InputCommand, Result};

/// Trait for storing and retrieving recorded input commands by frame.
///
/// Implementations choose their storage strategy; a bounded history must
/// report commands older than its window as unavailable rather than
/// returning a stale slot.
pub trait CommandHistory {
    /// Record a command at `cmd.frame`.
    ///
    /// Bounded implementations overwrite the oldest entry once full.
    fn record(&mut self, cmd: InputCommand);

    /// Get the command recorded for exactly `frame`, if still available.
    fn get(&self, frame: Frame) -> Option<&InputCommand>;

    /// Newest frame ever recorded.
    fn newest_frame(&self) -> Option<Frame>;

    /// Maximum number of frames retained.
    fn capacity(&self) -> usize;

    /// Number of commands currently stored.
    fn len(&self) -> usize;

    /// Check if the history is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored command.
    fn clear(&mut self);

    /// Oldest frame that can still be replayed.
    ///
    /// Returns `None` when nothing has been recorded.
    fn oldest_replayable(&self) -> Option<Frame> {
        self.newest_frame()
            .map(|newest| (newest + 1).saturating_sub(self.capacity() as Frame))
    }

    /// Verify that replay can start at `from`.
    ///
    /// Fails with `OutOfWindow` when `from <= newest - capacity`.
    fn check_window(&self, from: Frame) -> Result<()> {
        match self.oldest_replayable() {
            Some(oldest) if from < oldest => Err(Error::OutOfWindow { from, oldest }),
            _ => Ok(()),
        }
    }

    /// Commands for frames `from..=to` in strictly increasing frame order.
    ///
    /// Frames with no recorded command are skipped. `to` is clamped to the
    /// newest recorded frame.
    fn replay_range(&self, from: Frame, to: Frame) -> Result<Vec<InputCommand>> {
        self.check_window(from)?;

        let Some(newest) = self.newest_frame() else {
            return Ok(Vec::new());
        };
        let to = to.min(newest);
        if from > to {
            return Ok(Vec::new());
        }

        Ok((from..=to).filter_map(|frame| self.get(frame).copied()).collect())
    }
}
