//! Pmove Core - Shared vocabulary of the player movement system
//!
//! This crate provides the types every other pmove crate speaks:
//! - Vectors and view axes (`Vec3`, `angle_vectors`)
//! - Content, surface, movement-state and button flags
//! - Trace results and the `GeometryQuery` capability the kernel traces through
//! - `InputCommand` and `KinematicState`, identical on client and server
//! - Ground and liquid classification (`GroundInfo`, `LiquidInfo`)
//! - `MoveParams`, the immutable tunables handed to every kernel call
//! - Frame numbering and the `CommandHistory` trait
//!
//! ## Reference World
//!
//! `BoxWorld` implements `GeometryQuery` over axis-aligned brushes. Real
//! hosts plug in their own collision model; `BoxWorld` serves tests, tools
//! and simple levels.

mod box_world;
mod command;
mod error;
pub mod flags;
mod geometry;
mod history;
pub mod math;
mod params;
mod state;
pub mod time;
mod trace;

pub use box_world::{BoxWorld, Brush, DIST_EPSILON};
pub use command::InputCommand;
pub use error::{Error, Result};
pub use flags::{Buttons, ContentFlags, PmFlags, SurfaceFlags};
pub use geometry::GeometryQuery;
pub use history::CommandHistory;
pub use math::{angle_vectors, Axes, Vec3};
pub use params::MoveParams;
pub use state::{
    BoundsMode, GroundInfo, KinematicState, LiquidInfo, LiquidLevel, PlayerBounds, PmType,
};
pub use time::{Frame, FrameRate, BASE_FRAMERATE};
pub use trace::{EntityId, MaterialId, Plane, Surface, TraceResult};
