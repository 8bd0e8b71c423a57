//! Adapter module - drive a board from async code with a JSON protocol
//!
//! The core board is synchronous and never blocks. This crate puts it inside
//! a tokio task so a frontend, a bot or a test harness can play it over
//! channels:
//!
//! 1. **Commands**: [`protocol::Request`]s arrive on an mpsc channel
//! 2. **Ticking**: the task ticks the board on a `tokio::time::interval`
//! 3. **Events**: every presentation and goal callback becomes a
//!    [`protocol::SessionEvent`] on an unbounded channel
//! 4. **Animations**: events that block the board carry a
//!    `CompletionSignal`; the consumer fires it when its animation is done
//!
//! # Message Types
//!
//! ## Client → Session
//!
//! - **blast** / **activate**: player action at `x`, `y`
//! - **chain**: a projectile reached a special the open cascade destroyed
//! - **reset**: load a level by number
//! - **observe**: request a board snapshot
//!
//! ## Session → Client
//!
//! - **ack**: whether an action was accepted
//! - **error**: malformed request or failed level load
//! - **destroyed**, **obstacle_damaged**, **special_created**,
//!   **special_activated**, **fall_step**, **settled**: presentation events
//! - **goals_updated**, **moves_updated**, **game_over**, **level_cleared**
//! - **observation**: full board snapshot
//!
//! # Environment Variables
//!
//! - `BLAST_TICK_MS`: tick interval (default: 16)
//! - `BLAST_LEVELS_DIR`: directory holding `level_NN.json` (default: "levels")
//! - `BLAST_LEVEL`: level loaded at start (default: 1)
//! - `BLAST_ANIMATION_MS`: animation time the stdin runner simulates (default: 0)
//!
//! # Example Protocol Flow
//!
//! ```text
//! -> {"type":"blast","seq":1,"x":0,"y":0}
//! <- {"type":"destroyed","item":{"id":0,"kind":"r","x":0,"y":0,"health":1}}
//! <- {"type":"moves_updated","moves_left":19}
//! <- {"type":"ack","seq":1,"command":"blast","accepted":true}
//! <- {"type":"fall_step","item":{...},"from":[0,6],"to":[0,0]}
//! <- {"type":"settled"}
//! ```

pub mod protocol;
pub mod runtime;

pub use blast_board_core as core;
pub use blast_board_types as types;

pub use protocol::{parse_request, Command, ErrorCode, Request, SessionEvent};
pub use runtime::{
    run_session, spawn_session, ChannelGoals, ChannelPresentation, Emitted, Session, SessionConfig,
    SessionHandle,
};
