//! Core simulation - deterministic, synchronous, and testable
//!
//! This crate contains every rule of the blast board: the grid arena, region
//! search, obstacle damage, rockets and combos, gravity with refill, goal
//! bookkeeping and the phase state machine that sequences them. It draws
//! nothing and reads no input, making it:
//!
//! - **Deterministic**: the same seed produces identical refills and rockets
//! - **Testable**: every rule has unit tests against hand-built grids
//! - **Portable**: presentation plugs in through two small sink traits
//!
//! # Module Structure
//!
//! - [`grid`]: item arena with bounds-checked access
//! - [`matching`]: connected same-kind regions
//! - [`obstacles`]: splash and direct damage with per-batch dedup
//! - [`special`]: rocket creation, activation, combos and line sweeps
//! - [`gravity`]: column compaction, refill and primed recompute
//! - [`goals`]: remaining obstacles per kind
//! - [`level`]: level records, validation and level sources
//! - [`sink`]: presentation/goal contracts and completion handles
//! - [`board`]: the state machine (`Ready -> Processing -> Falling -> Ready`)
//!
//! # Rules
//!
//! - **Blast**: a 4-connected same-color region of two or more cubes is cleared
//! - **Rocket**: a region of four or more leaves a rocket at the clicked cell
//! - **Combo**: activating a rocket next to another special sweeps a cross
//! - **Obstacles**: Box and Vase take splash from adjacent clears, Stone only
//!   breaks under a rocket; Vase needs two hits
//! - **Moves**: every accepted blast or activation spends one; going below
//!   zero ends the game once the resolution settles
//!
//! # Example
//!
//! ```
//! use blast_board_core::{Board, BoardConfig, Grid, MemoryLevelSource, NullSink};
//! use blast_board_core::types::BoardState;
//!
//! let mut board = Board::new(
//!     BoardConfig::default().with_seed(7),
//!     MemoryLevelSource::new(),
//!     NullSink,
//!     NullSink,
//! );
//! board.load_grid(Grid::from_rows(&["g b", "r r"]).unwrap(), 10);
//!
//! assert!(board.try_blast(0, 0));
//! assert_eq!(board.state(), BoardState::Processing);
//!
//! // Animations complete instantly with NullSink.
//! board.tick(16);
//! assert_eq!(board.state(), BoardState::Ready);
//! assert_eq!(board.moves_left(), 9);
//! ```
//!
//! # Timing
//!
//! The board never sleeps. Call [`Board::tick`](board::Board::tick) every
//! frame with the elapsed time; it polls completion handles and runs down the
//! chain debounce (400ms by default, re-armed by every activation).

pub mod board;
pub mod config;
pub mod goals;
pub mod gravity;
pub mod grid;
pub mod level;
pub mod matching;
pub mod obstacles;
pub mod rng;
pub mod sink;
pub mod snapshot;
pub mod special;

pub use blast_board_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use config::BoardConfig;
pub use goals::{GoalEntry, Goals};
pub use gravity::{compact, is_settled, recompute_primed, refill, FallStep};
pub use grid::{Grid, Item, ItemId};
pub use level::{DirLevelSource, Level, LevelData, LevelDataError, LevelSource, MemoryLevelSource};
pub use matching::{all_regions, find_connected_region, has_valid_move};
pub use obstacles::{damage_adjacent, damage_direct, ObstacleHit};
pub use rng::SimpleRng;
pub use sink::{CompletionHandle, CompletionSignal, GoalSink, NullSink, PresentationSink};
pub use snapshot::{BoardSnapshot, CellSnapshot};
pub use special::{Cascade, CascadeEvent, ComboShape};
