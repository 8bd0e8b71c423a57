//! Grid module - owns every item on the board
//!
//! The grid is a `width x height` arena of optional items stored row-major in a
//! flat vector (`y * width + x`). Items carry their own coordinates but never a
//! handle back to the grid; the grid is the only place that rewrites them, so a
//! stored `(x, y)` always matches the slot holding the item.
//!
//! Coordinates: `x` grows to the right, `y` grows upward, `(0, 0)` is the
//! bottom-left cell. Every coordinate-taking method treats out-of-bounds input
//! as a no-op, because edge-adjacent neighbor scans hit the border constantly.

use arrayvec::ArrayVec;

use crate::types::{ItemKind, Position, MAX_BOARD_DIMENSION, ORTHOGONAL};

/// Identity of an item, unique within one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u32);

impl ItemId {
    pub fn get(&self) -> u32 {
        self.0
    }
}

/// A live item on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    kind: ItemKind,
    x: i8,
    y: i8,
    health: u8,
    primed: bool,
}

impl Item {
    fn new(id: ItemId, kind: ItemKind, x: i8, y: i8) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            health: kind.initial_health(),
            primed: false,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn x(&self) -> i8 {
        self.x
    }

    pub fn y(&self) -> i8 {
        self.y
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn health(&self) -> u8 {
        self.health
    }

    pub fn can_fall(&self) -> bool {
        self.kind.can_fall()
    }

    /// True once an obstacle has lost health but is still standing.
    pub fn is_damaged(&self) -> bool {
        self.health > 0 && self.health < self.kind.initial_health()
    }

    /// Cube sitting in a region large enough to leave a special behind.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Apply one point of damage. Returns true when the item is destroyed.
    pub(crate) fn take_damage(&mut self) -> bool {
        self.health = self.health.saturating_sub(1);
        self.health == 0
    }

    pub(crate) fn set_primed(&mut self, primed: bool) {
        self.primed = primed;
    }
}

/// The board arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u8,
    height: u8,
    cells: Vec<Option<Item>>,
    next_id: u32,
}

impl Grid {
    /// Create an empty grid. Dimensions are clamped to `1..=MAX_BOARD_DIMENSION`.
    pub fn new(width: u8, height: u8) -> Self {
        let width = width.clamp(1, MAX_BOARD_DIMENSION);
        let height = height.clamp(1, MAX_BOARD_DIMENSION);
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            next_id: 0,
        }
    }

    /// Build a grid from text rows, top row first, for fixtures and benches.
    ///
    /// Cells are whitespace-separated item codes; `.` marks an empty cell.
    /// Returns `None` on ragged rows or unknown codes.
    ///
    /// ```
    /// use blast_board_core::Grid;
    /// use blast_board_core::types::ItemKind;
    ///
    /// let grid = Grid::from_rows(&[
    ///     "r  .",
    ///     "bo g",
    /// ]).unwrap();
    /// assert_eq!(grid.get(0, 1).map(|i| i.kind()), Some(ItemKind::Red));
    /// assert_eq!(grid.get(0, 0).map(|i| i.kind()), Some(ItemKind::Box));
    /// assert!(grid.get(1, 1).is_none());
    /// ```
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        let height = u8::try_from(rows.len()).ok()?;
        let width = u8::try_from(rows.first()?.split_whitespace().count()).ok()?;
        if width == 0 || width > MAX_BOARD_DIMENSION || height > MAX_BOARD_DIMENSION {
            return None;
        }

        let mut grid = Self::new(width, height);
        for (row_idx, row) in rows.iter().enumerate() {
            let y = (height as usize - 1 - row_idx) as i8;
            let codes: Vec<&str> = row.split_whitespace().collect();
            if codes.len() != width as usize {
                return None;
            }
            for (x, code) in codes.into_iter().enumerate() {
                if code == "." {
                    continue;
                }
                let kind = ItemKind::from_str(code)?;
                grid.spawn(x as i8, y, kind)?;
            }
        }
        Some(grid)
    }

    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i8 || y >= self.height as i8 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn within_bounds(&self, x: i8, y: i8) -> bool {
        self.index(x, y).is_some()
    }

    pub fn get(&self, x: i8, y: i8) -> Option<&Item> {
        self.index(x, y).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn get_at(&self, pos: Position) -> Option<&Item> {
        self.get(pos.x, pos.y)
    }

    pub(crate) fn get_mut(&mut self, x: i8, y: i8) -> Option<&mut Item> {
        let idx = self.index(x, y)?;
        self.cells[idx].as_mut()
    }

    /// In bounds and unoccupied.
    pub fn is_empty_at(&self, x: i8, y: i8) -> bool {
        matches!(self.index(x, y), Some(idx) if self.cells[idx].is_none())
    }

    /// Place `item` at `(x, y)`, rewriting its stored position.
    ///
    /// Returns the displaced occupant, if any. Out of bounds is a no-op that
    /// hands the item straight back.
    pub fn set(&mut self, x: i8, y: i8, mut item: Item) -> Option<Item> {
        let Some(idx) = self.index(x, y) else {
            return Some(item);
        };
        item.x = x;
        item.y = y;
        let prior = self.cells[idx].replace(item);
        self.debug_check_invariants();
        prior
    }

    pub fn remove(&mut self, x: i8, y: i8) -> Option<Item> {
        let idx = self.index(x, y)?;
        self.cells[idx].take()
    }

    /// Create a fresh item of `kind` at `(x, y)`, replacing any occupant.
    pub fn spawn(&mut self, x: i8, y: i8, kind: ItemKind) -> Option<ItemId> {
        self.index(x, y)?;
        let id = ItemId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.set(x, y, Item::new(id, kind, x, y));
        Some(id)
    }

    /// Move the item at `from` into the empty slot `to`.
    pub fn move_item(&mut self, from: Position, to: Position) -> bool {
        if from == to || !self.is_empty_at(to.x, to.y) {
            return false;
        }
        match self.remove(from.x, from.y) {
            Some(item) => {
                self.set(to.x, to.y, item);
                true
            }
            None => false,
        }
    }

    /// In-bounds orthogonal neighbors of `pos`.
    pub fn neighbors(&self, pos: Position) -> ArrayVec<Position, 4> {
        let mut out = ArrayVec::new();
        for (dx, dy) in ORTHOGONAL {
            if let Some(n) = pos.offset(dx, dy) {
                if self.within_bounds(n.x, n.y) {
                    out.push(n);
                }
            }
        }
        out
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.cells.iter().flatten()
    }

    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.cells.iter_mut().flatten()
    }

    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items().find(|item| item.id == id)
    }

    pub fn count_kind(&self, kind: ItemKind) -> usize {
        self.items().filter(|item| item.kind == kind).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Render as text rows, top row first, in the `from_rows` format.
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height as i8)
            .rev()
            .map(|y| {
                (0..self.width as i8)
                    .map(|x| self.get(x, y).map_or(".", |item| item.kind.as_str()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    #[cfg(debug_assertions)]
    fn debug_check_invariants(&self) {
        let mut seen = std::collections::HashSet::new();
        for (idx, item) in self.cells.iter().enumerate() {
            let Some(item) = item else { continue };
            let x = (idx % self.width as usize) as i8;
            let y = (idx / self.width as usize) as i8;
            debug_assert_eq!((item.x, item.y), (x, y), "item {:?} out of slot", item.id);
            debug_assert!(seen.insert(item.id), "item {:?} in two slots", item.id);
        }
    }

    #[cfg(not(debug_assertions))]
    fn debug_check_invariants(&self) {}
}
