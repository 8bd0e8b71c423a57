//! Shared types and constants for the blast board.
//!
//! Everything here is plain data with no external dependencies, so it can be
//! used by the simulation core, the async session adapter and any renderer.
//!
//! # Coordinates
//!
//! Boards are addressed with `(x, y)` where `x` grows to the right and `y`
//! grows upward. Row `y = 0` is the bottom of the board and items fall toward
//! it. Level layouts list the bottom row first.
//!
//! # Item vocabulary
//!
//! | Code   | Kind               | Class    | Health | Falls |
//! |--------|--------------------|----------|--------|-------|
//! | `r`    | Red                | cube     | 1      | yes   |
//! | `g`    | Green              | cube     | 1      | yes   |
//! | `b`    | Blue               | cube     | 1      | yes   |
//! | `y`    | Yellow             | cube     | 1      | yes   |
//! | `hro`  | RocketHorizontal   | special  | 1      | yes   |
//! | `vro`  | RocketVertical     | special  | 1      | yes   |
//! | `bo`   | Box                | obstacle | 1      | no    |
//! | `s`    | Stone              | obstacle | 1      | no    |
//! | `v`    | Vase               | obstacle | 2      | yes   |
//!
//! Level files may also use `rand`, resolved to a random cube when the level
//! is populated.
//!
//! # Examples
//!
//! ```
//! use blast_board_types::{Direction, ItemKind, LevelCell};
//!
//! let kind = ItemKind::from_str("hro").unwrap();
//! assert!(kind.is_special());
//! assert_eq!(kind.direction(), Some(Direction::Horizontal));
//!
//! assert_eq!(LevelCell::from_str("rand"), Some(LevelCell::RandomCube));
//! assert_eq!(ItemKind::Vase.initial_health(), 2);
//! assert!(!ItemKind::Box.can_fall());
//! ```

/// Smallest region that counts as a valid blast.
pub const MIN_BLAST_REGION: usize = 2;

/// Smallest region that leaves a special item behind.
pub const SPECIAL_REGION_SIZE: usize = 4;

/// Largest accepted board dimension on either axis.
pub const MAX_BOARD_DIMENSION: u8 = 64;

/// Grace period for chained activations before a cascade is declared finished.
pub const CHAIN_DEBOUNCE_MS: u32 = 400;

/// Default fixed-step interval used by session runners (~60 FPS).
pub const TICK_MS: u32 = 16;

/// Health of a freshly placed vase.
pub const VASE_HEALTH: u8 = 2;

/// Orthogonal neighbor offsets, in scan order: up, right, down, left.
pub const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Every kind the board can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    Red,
    Green,
    Blue,
    Yellow,
    RocketHorizontal,
    RocketVertical,
    Box,
    Stone,
    Vase,
}

impl ItemKind {
    /// The four matchable colors, in the order random draws index them.
    pub const CUBES: [ItemKind; 4] = [
        ItemKind::Red,
        ItemKind::Green,
        ItemKind::Blue,
        ItemKind::Yellow,
    ];

    /// The two directional specials.
    pub const SPECIALS: [ItemKind; 2] = [ItemKind::RocketHorizontal, ItemKind::RocketVertical];

    pub const OBSTACLES: [ItemKind; 3] = [ItemKind::Box, ItemKind::Stone, ItemKind::Vase];

    /// Parse a level-file code (case-insensitive).
    ///
    /// ```
    /// use blast_board_types::ItemKind;
    ///
    /// assert_eq!(ItemKind::from_str("bo"), Some(ItemKind::Box));
    /// assert_eq!(ItemKind::from_str("R"), Some(ItemKind::Red));
    /// assert_eq!(ItemKind::from_str("rand"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "r" => Some(ItemKind::Red),
            "g" => Some(ItemKind::Green),
            "b" => Some(ItemKind::Blue),
            "y" => Some(ItemKind::Yellow),
            "hro" => Some(ItemKind::RocketHorizontal),
            "vro" => Some(ItemKind::RocketVertical),
            "bo" => Some(ItemKind::Box),
            "s" => Some(ItemKind::Stone),
            "v" => Some(ItemKind::Vase),
            _ => None,
        }
    }

    /// Level-file code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Red => "r",
            ItemKind::Green => "g",
            ItemKind::Blue => "b",
            ItemKind::Yellow => "y",
            ItemKind::RocketHorizontal => "hro",
            ItemKind::RocketVertical => "vro",
            ItemKind::Box => "bo",
            ItemKind::Stone => "s",
            ItemKind::Vase => "v",
        }
    }

    pub fn is_cube(&self) -> bool {
        matches!(
            self,
            ItemKind::Red | ItemKind::Green | ItemKind::Blue | ItemKind::Yellow
        )
    }

    pub fn is_special(&self) -> bool {
        matches!(self, ItemKind::RocketHorizontal | ItemKind::RocketVertical)
    }

    pub fn is_obstacle(&self) -> bool {
        matches!(self, ItemKind::Box | ItemKind::Stone | ItemKind::Vase)
    }

    /// Box and Stone hold their slot; everything else is pulled down.
    pub fn can_fall(&self) -> bool {
        !matches!(self, ItemKind::Box | ItemKind::Stone)
    }

    pub fn initial_health(&self) -> u8 {
        match self {
            ItemKind::Vase => VASE_HEALTH,
            _ => 1,
        }
    }

    /// Sweep direction of a special, `None` for every other kind.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            ItemKind::RocketHorizontal => Some(Direction::Horizontal),
            ItemKind::RocketVertical => Some(Direction::Vertical),
            _ => None,
        }
    }
}

/// Sweep direction of a rocket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
        }
    }

    /// Special kind that sweeps in this direction.
    pub fn rocket_kind(&self) -> ItemKind {
        match self {
            Direction::Horizontal => ItemKind::RocketHorizontal,
            Direction::Vertical => ItemKind::RocketVertical,
        }
    }
}

/// One entry of a level layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelCell {
    Item(ItemKind),
    /// Resolved to a uniformly random cube at population time.
    RandomCube,
}

impl LevelCell {
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("rand") {
            return Some(LevelCell::RandomCube);
        }
        ItemKind::from_str(s).map(LevelCell::Item)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelCell::Item(kind) => kind.as_str(),
            LevelCell::RandomCube => "rand",
        }
    }
}

/// Board-wide phase.
///
/// - **Ready**: accepts player actions
/// - **Processing**: a blast or activation cascade is resolving
/// - **Falling**: gravity and refill are animating
/// - **GameOver**: terminal until the level is reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoardState {
    #[default]
    Ready,
    Processing,
    Falling,
    GameOver,
}

impl BoardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardState::Ready => "ready",
            BoardState::Processing => "processing",
            BoardState::Falling => "falling",
            BoardState::GameOver => "game_over",
        }
    }
}

/// A cell coordinate. May lie outside the board (refill spawn points do).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i8,
    pub y: i8,
}

impl Position {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Offset by `(dx, dy)`, `None` on `i8` overflow.
    pub fn offset(&self, dx: i8, dy: i8) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

impl From<(i8, i8)> for Position {
    fn from((x, y): (i8, i8)) -> Self {
        Self { x, y }
    }
}

/// A rocket firing: emitted once per swept line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RocketActivation {
    pub origin: Position,
    pub direction: Direction,
}
