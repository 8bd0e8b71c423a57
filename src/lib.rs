//! Blast board (workspace facade crate).
//!
//! Re-exports `blast_board::{core,adapter,types}` while the implementation
//! lives in dedicated crates under `crates/`.

pub use blast_board_adapter as adapter;
pub use blast_board_core as core;
pub use blast_board_types as types;
