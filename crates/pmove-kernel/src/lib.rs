//! Pmove Kernel - Deterministic player movement
//!
//! This crate implements `player_move`, the single function both client and
//! server run once per tick to advance a player:
//!
//! - **Classification**: ground probe and feet/waist/eye liquid sampling
//! - **Stance**: ducking, standing up, bounds per movement type
//! - **Input**: friction, ground/air/water acceleration, jumping
//! - **Special movement**: ladders, water jumps, currents and conveyors
//! - **Collision**: slide move with velocity clipping, wrapped by a step
//!   move that climbs stairs up to `MoveParams::step_size`
//!
//! The kernel has no global state. Everything it needs arrives through a
//! [`MoveContext`] and everything it produces comes back in a [`MoveResult`].
//! Collision queries go through the `GeometryQuery` trait, so any world
//! representation can be plugged in.
//!
//! # Example
//!
//! ```rust,ignore
//! use pmove_core::{InputCommand, KinematicState, MoveParams};
//! use pmove_kernel::{player_move, MoveContext};
//!
//! let params = MoveParams::default();
//! let mut state = KinematicState::at(spawn_point);
//!
//! loop {
//!     let cmd = next_command();
//!     let result = player_move(MoveContext::new(&world, &params, cmd, state).skip_entity(me));
//!     run_triggers(result.touches.iter());
//!     state = result.state;
//! }
//! ```

mod categorize;
mod context;
mod currents;
mod friction;
mod moves;
mod outcome;
mod pmove;
mod slide;
mod special;
mod stance;
mod touch;

pub use context::{MoveContext, MoveResult};
pub use currents::current_direction;
pub use outcome::{MoveOutcome, MoveOutcomes, MoveReport};
pub use pmove::player_move;
pub use slide::{clip_velocity, ClipFlags};
pub use touch::{TouchTrace, TouchTraceList, MAX_TOUCH_TRACES};
