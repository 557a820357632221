//! Pmove Command Buffer - Fixed-capacity ring buffer of input commands
//!
//! Client and server both keep the commands they have seen in a
//! `CommandRingBuffer`, indexed by `frame & (capacity - 1)`:
//!
//! - **Bounded memory**: the slot array is allocated once, nothing grows
//! - **O(1) record and lookup**: a frame maps straight to its slot
//! - **Eviction on advance**: slots of frames that fall out of the window
//!   are freed as `newest` moves, so commands older than `newest - capacity`
//!   are never replayed or counted
//!
//! # Example
//!
//! ```rust
//! use pmove_command_buffer::CommandRingBuffer;
//! use pmove_core::{CommandHistory, InputCommand};
//!
//! let mut buffer = CommandRingBuffer::new(64);
//! for frame in 100..=110 {
//!     buffer.record(InputCommand::new(frame, 16).with_move(300.0, 0.0, 0.0));
//! }
//!
//! // everything after the acknowledged frame, oldest first
//! let pending = buffer.replay_range(100, 110).unwrap();
//! assert_eq!(pending.len(), 10);
//! assert_eq!(pending[0].frame, 101);
//! ```

use pmove_core::{CommandHistory, Frame, InputCommand};

/// Capacity of the buffer when none is given
pub const DEFAULT_CAPACITY: usize = 1024;

/// A ring buffer of recent input commands
#[derive(Debug, Clone)]
pub struct CommandRingBuffer {
    /// Slot storage, `None` means never written or cleared
    slots: Vec<Option<InputCommand>>,
    /// `capacity - 1`, capacity is a power of two
    mask: usize,
    /// Newest frame ever recorded
    newest: Option<Frame>,
    /// Number of occupied slots
    count: usize,
}

impl CommandRingBuffer {
    /// Create a buffer holding at least `capacity` frames.
    ///
    /// The capacity is rounded up to the next power of two so a frame maps
    /// to its slot with a mask.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pmove_command_buffer::CommandRingBuffer;
    /// use pmove_core::CommandHistory;
    ///
    /// assert_eq!(CommandRingBuffer::new(100).capacity(), 128);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        Self {
            slots: vec![None; capacity],
            mask: capacity - 1,
            newest: None,
            count: 0,
        }
    }

    fn slot_index(&self, frame: Frame) -> usize {
        (frame as usize) & self.mask
    }

    /// Check that `frame` is inside the replay window.
    pub fn is_frame_valid(&self, frame: Frame) -> bool {
        match (self.oldest_replayable(), self.newest) {
            (Some(oldest), Some(newest)) => frame >= oldest && frame <= newest,
            _ => false,
        }
    }

    /// Free the slots of frames in `from..to` that left the replay window.
    ///
    /// A jump of more than one capacity touches each slot at most once.
    fn evict(&mut self, from: Frame, to: Frame) {
        let span = (to - from).min(self.slots.len() as Frame);
        for frame in from..from + span {
            let index = self.slot_index(frame);
            if self.slots[index].is_some_and(|cmd| cmd.frame < to) {
                self.slots[index] = None;
                self.count -= 1;
            }
        }
    }

    /// Stored commands, oldest frame first
    pub fn iter(&self) -> impl Iterator<Item = &InputCommand> {
        let mut commands: Vec<_> = self.slots.iter().flatten().collect();
        commands.sort_by_key(|cmd| cmd.frame);
        commands.into_iter()
    }

    /// Get statistics about the buffer
    pub fn stats(&self) -> BufferStats {
        let oldest = self.iter().next().map(|cmd| cmd.frame).unwrap_or(0);
        BufferStats {
            capacity: self.slots.len(),
            count: self.count,
            oldest_frame: oldest,
            newest_frame: self.newest.unwrap_or(0),
        }
    }
}

impl CommandHistory for CommandRingBuffer {
    fn record(&mut self, cmd: InputCommand) {
        // too old to ever be replayed, and would clobber a live slot
        if self.oldest_replayable().is_some_and(|oldest| cmd.frame < oldest) {
            return;
        }

        let previous_oldest = self.oldest_replayable();
        self.newest = Some(self.newest.map_or(cmd.frame, |n| n.max(cmd.frame)));
        if let (Some(from), Some(to)) = (previous_oldest, self.oldest_replayable()) {
            self.evict(from, to);
        }

        let index = self.slot_index(cmd.frame);
        if self.slots[index].is_none() {
            self.count += 1;
        }
        self.slots[index] = Some(cmd);
    }

    fn get(&self, frame: Frame) -> Option<&InputCommand> {
        if !self.is_frame_valid(frame) {
            return None;
        }
        self.slots[self.slot_index(frame)]
            .as_ref()
            .filter(|cmd| cmd.frame == frame)
    }

    fn newest_frame(&self) -> Option<Frame> {
        self.newest
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn len(&self) -> usize {
        self.count
    }

    fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.newest = None;
        self.count = 0;
    }
}

impl Default for CommandRingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Statistics about the command buffer
#[derive(Debug, Clone, Copy)]
pub struct BufferStats {
    /// Number of slots
    pub capacity: usize,
    /// Occupied slots
    pub count: usize,
    /// Oldest stored frame
    pub oldest_frame: Frame,
    /// Newest stored frame
    pub newest_frame: Frame,
}

impl BufferStats {
    /// Get the frame span (newest - oldest)
    pub fn frame_span(&self) -> Frame {
        if self.count == 0 {
            0
        } else {
            self.newest_frame - self.oldest_frame
        }
    }

    /// Get the fill percentage (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f32 {
        self.count as f32 / self.capacity as f32
    }
}
