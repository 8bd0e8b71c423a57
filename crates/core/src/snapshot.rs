use serde::Serialize;

use crate::goals::GoalEntry;
use crate::grid::Grid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellSnapshot {
    pub x: i8,
    pub y: i8,
    pub id: u32,
    pub kind: &'static str,
    pub health: u8,
    pub damaged: bool,
    pub primed: bool,
}

/// Read-only view of a board, for observers and the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub level: Option<u32>,
    pub width: u8,
    pub height: u8,
    pub state: &'static str,
    pub moves_left: i32,
    pub goals: Vec<GoalEntry>,
    pub level_cleared: bool,
    /// Occupied cells only, bottom row first.
    pub cells: Vec<CellSnapshot>,
}

impl BoardSnapshot {
    pub fn cells_from(grid: &Grid) -> Vec<CellSnapshot> {
        grid.items()
            .map(|item| CellSnapshot {
                x: item.x(),
                y: item.y(),
                id: item.id().get(),
                kind: item.kind().as_str(),
                health: item.health(),
                damaged: item.is_damaged(),
                primed: item.is_primed(),
            })
            .collect()
    }

    pub fn playable(&self) -> bool {
        self.state == "ready" && !self.level_cleared
    }

    pub fn cell(&self, x: i8, y: i8) -> Option<&CellSnapshot> {
        self.cells.iter().find(|c| c.x == x && c.y == y)
    }
}
