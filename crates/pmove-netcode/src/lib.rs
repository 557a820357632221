//! Pmove Netcode - Prediction and authority around the movement kernel
//!
//! Client and server run the same `player_move` over the same commands.
//! This crate keeps the two views of a player consistent:
//!
//! - **Authority**: the server consumes one command per tick and publishes
//!   the result as a baseline
//! - **Prediction**: the client replays every command newer than its baseline
//!   for immediate rendering
//! - **Reconciliation**: a new baseline is compared against what was predicted
//!   for its frame; misses are smoothed, large ones snap
//! - **Step smoothing**: stair steps and eye height changes are eased visually
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐          ┌───────────────────────────┐
//! │           Client             │          │          Server           │
//! │  ┌──────────────┐            │ commands │  ┌─────────────────────┐  │
//! │  │ Command Ring │────────────┼─────────▶│  │   ServerAuthority   │  │
//! │  └──────────────┘            │          │  │ one command / tick  │  │
//! │         │                    │          │  └─────────────────────┘  │
//! │         ▼                    │ baseline │             │             │
//! │  ┌──────────────┐  ┌───────┐ │◀─────────┼─────────────┘             │
//! │  │  Predictor   │◀─│Reconc.│◀┘          │                           │
//! │  └──────────────┘  └───────┘            └───────────────────────────┘
//! │         │                    │
//! │         ▼                    │
//! │  ┌──────────────┐            │
//! │  │ Step / error │──▶ render  │
//! │  └──────────────┘            │
//! └──────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pmove_core::MoveParams;
//! use pmove_netcode::{PredictionConfig, Predictor};
//!
//! let mut predictor = Predictor::new(MoveParams::default(), PredictionConfig::default());
//!
//! // Client loop
//! loop {
//!     let cmd = build_command(frame);
//!     predictor.record_command(cmd);
//!     send_to_server(cmd);
//!
//!     if let Some(baseline) = receive_snapshot() {
//!         predictor.reconcile(baseline, now_ms);
//!     }
//!
//!     match predictor.predict(&world, now_ms) {
//!         Ok(view) => render(view.state.origin + predictor.render_error(backlerp)),
//!         Err(pmove_netcode::Error::OutOfWindow { .. }) => request_full_snapshot(),
//!         Err(_) => {}
//!     }
//! }
//! ```

mod authority;
mod config;
mod error;
mod prediction;
mod reconciliation;
mod step_smoothing;

pub use authority::ServerAuthority;
pub use config::{PredictionConfig, MAX_REPLAY_LIMIT};
pub use error::{Error, Result};
pub use prediction::{PredictedFrame, PredictionBaseline, Predictor};
pub use reconciliation::{compare, ReconcileOutcome};
pub use step_smoothing::{StepSmoother, ViewHeightTransition};

// Re-export the history trait and default storage for convenience
pub use pmove_command_buffer::CommandRingBuffer;
pub use pmove_core::CommandHistory;
