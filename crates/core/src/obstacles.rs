//! Obstacle damage - splash from adjacent clears and direct rocket hits
//!
//! Each obstacle takes at most one point of damage per resolution batch; the
//! caller threads a `processed` set through every call of the batch.

use std::collections::HashSet;

use crate::grid::{Grid, Item};
use crate::types::{ItemKind, Position};

/// What happened to one obstacle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObstacleHit {
    /// Still standing, with its health already reduced.
    Damaged(Item),
    /// Health reached zero; the item has been removed from the grid.
    Destroyed(Item),
}

impl ObstacleHit {
    pub fn item(&self) -> &Item {
        match self {
            ObstacleHit::Damaged(item) | ObstacleHit::Destroyed(item) => item,
        }
    }
}

/// Splash damage to obstacles orthogonally adjacent to `cleared` cells.
///
/// Stone ignores splash entirely.
pub fn damage_adjacent(
    grid: &mut Grid,
    cleared: &[Position],
    processed: &mut HashSet<Position>,
) -> Vec<ObstacleHit> {
    let mut hits = Vec::new();
    for &cell in cleared {
        for neighbor in grid.neighbors(cell) {
            let Some(item) = grid.get_at(neighbor) else {
                continue;
            };
            if !item.kind().is_obstacle() || item.kind() == ItemKind::Stone {
                continue;
            }
            if let Some(hit) = apply_hit(grid, neighbor, processed) {
                hits.push(hit);
            }
        }
    }
    hits
}

/// A rocket passing through `pos`. Unlike splash, this also chips stone.
pub fn damage_direct(
    grid: &mut Grid,
    pos: Position,
    processed: &mut HashSet<Position>,
) -> Option<ObstacleHit> {
    if !grid.get_at(pos)?.kind().is_obstacle() {
        return None;
    }
    apply_hit(grid, pos, processed)
}

fn apply_hit(
    grid: &mut Grid,
    pos: Position,
    processed: &mut HashSet<Position>,
) -> Option<ObstacleHit> {
    if !processed.insert(pos) {
        return None;
    }
    let item = grid.get_mut(pos.x, pos.y)?;
    if item.take_damage() {
        grid.remove(pos.x, pos.y).map(ObstacleHit::Destroyed)
    } else {
        Some(ObstacleHit::Damaged(item.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i8, y: i8) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_box_destroyed_by_splash() {
        let mut grid = Grid::from_rows(&["r bo"]).unwrap();
        let mut processed = HashSet::new();
        let hits = damage_adjacent(&mut grid, &[pos(0, 0)], &mut processed);
        assert_eq!(hits.len(), 1);
        assert!(matches!(hits[0], ObstacleHit::Destroyed(_)));
        assert!(grid.get(1, 0).is_none());
    }

    #[test]
    fn test_shared_neighbor_damaged_once() {
        // Vase touches both cleared cells.
        let mut grid = Grid::from_rows(&[
            "r v", //
            "r r", //
        ])
        .unwrap();
        let mut processed = HashSet::new();
        let hits = damage_adjacent(&mut grid, &[pos(0, 1), pos(1, 0)], &mut processed);
        assert_eq!(hits.len(), 1);
        let vase = grid.get(1, 1).unwrap();
        assert_eq!(vase.health(), 1);
        assert!(vase.is_damaged());
    }

    #[test]
    fn test_stone_immune_to_splash() {
        let mut grid = Grid::from_rows(&["s r s"]).unwrap();
        for _ in 0..5 {
            let mut processed = HashSet::new();
            let hits = damage_adjacent(&mut grid, &[pos(1, 0)], &mut processed);
            assert!(hits.is_empty());
        }
        assert_eq!(grid.get(0, 0).unwrap().health(), 1);
        assert_eq!(grid.get(2, 0).unwrap().health(), 1);
    }

    #[test]
    fn test_cubes_are_not_damaged() {
        let mut grid = Grid::from_rows(&["r g"]).unwrap();
        let mut processed = HashSet::new();
        assert!(damage_adjacent(&mut grid, &[pos(0, 0)], &mut processed).is_empty());
        assert!(grid.get(1, 0).is_some());
    }

    #[test]
    fn test_direct_hit_breaks_stone() {
        let mut grid = Grid::from_rows(&["s"]).unwrap();
        let mut processed = HashSet::new();
        let hit = damage_direct(&mut grid, pos(0, 0), &mut processed);
        assert!(matches!(hit, Some(ObstacleHit::Destroyed(_))));
        assert!(grid.get(0, 0).is_none());
    }

    #[test]
    fn test_direct_hit_respects_processed() {
        let mut grid = Grid::from_rows(&["v"]).unwrap();
        let mut processed = HashSet::new();
        assert!(damage_direct(&mut grid, pos(0, 0), &mut processed).is_some());
        assert!(damage_direct(&mut grid, pos(0, 0), &mut processed).is_none());
        assert_eq!(grid.get(0, 0).unwrap().health(), 1);
    }
}
