//! Matching module - connected same-kind regions
//!
//! Breadth-first flood fill over the four orthogonal neighbors. Only cubes are
//! ever blasted, but the search itself just compares kinds, so obstacles can
//! never join a cube region.

use std::collections::{HashSet, VecDeque};

use crate::grid::Grid;
use crate::types::{Position, MIN_BLAST_REGION, SPECIAL_REGION_SIZE};

/// Maximal 4-connected region of cells sharing the kind at `(x, y)`.
///
/// The seed comes first, followed by cells in BFS order. Empty or
/// out-of-bounds seeds yield an empty region.
pub fn find_connected_region(grid: &Grid, x: i8, y: i8) -> Vec<Position> {
    let Some(seed) = grid.get(x, y) else {
        return Vec::new();
    };
    let kind = seed.kind();
    let start = Position::new(x, y);

    let mut region = vec![start];
    let mut visited: HashSet<Position> = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for next in grid.neighbors(current) {
            if visited.contains(&next) {
                continue;
            }
            if grid.get_at(next).is_some_and(|item| item.kind() == kind) {
                visited.insert(next);
                region.push(next);
                queue.push_back(next);
            }
        }
    }

    region
}

/// Partition every cube on the grid into its regions.
pub fn all_regions(grid: &Grid) -> Vec<Vec<Position>> {
    let mut assigned: HashSet<Position> = HashSet::new();
    let mut regions = Vec::new();

    for y in 0..grid.height() as i8 {
        for x in 0..grid.width() as i8 {
            let pos = Position::new(x, y);
            if assigned.contains(&pos) {
                continue;
            }
            if !grid.get(x, y).is_some_and(|item| item.kind().is_cube()) {
                continue;
            }
            let region = find_connected_region(grid, x, y);
            assigned.extend(region.iter().copied());
            regions.push(region);
        }
    }

    regions
}

pub fn is_valid_blast(region_len: usize) -> bool {
    region_len >= MIN_BLAST_REGION
}

pub fn spawns_special(region_len: usize) -> bool {
    region_len >= SPECIAL_REGION_SIZE
}

/// True when at least one region on the grid can be blasted.
pub fn has_valid_move(grid: &Grid) -> bool {
    grid.items().any(|item| item.kind().is_special())
        || all_regions(grid)
            .iter()
            .any(|region| is_valid_blast(region.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemKind;

    fn sorted(mut v: Vec<Position>) -> Vec<Position> {
        v.sort();
        v
    }

    #[test]
    fn test_region_includes_seed_first() {
        let grid = Grid::from_rows(&["r r", "g r"]).unwrap();
        let region = find_connected_region(&grid, 1, 0);
        assert_eq!(region[0], Position::new(1, 0));
        assert_eq!(region.len(), 3);
    }

    #[test]
    fn test_region_is_maximal_and_same_kind() {
        let grid = Grid::from_rows(&[
            "r r g b", //
            "g r g b", //
            "r r r b", //
        ])
        .unwrap();
        let region = find_connected_region(&grid, 0, 0);
        assert_eq!(
            sorted(region.clone()),
            sorted(vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(2, 0),
                Position::new(1, 1),
                Position::new(1, 2),
                Position::new(0, 2),
            ])
        );
        for pos in &region {
            assert_eq!(grid.get_at(*pos).unwrap().kind(), ItemKind::Red);
            for n in grid.neighbors(*pos) {
                if grid.get_at(n).map(|i| i.kind()) == Some(ItemKind::Red) {
                    assert!(region.contains(&n), "{:?} left out", n);
                }
            }
        }
    }

    #[test]
    fn test_diagonals_do_not_connect() {
        let grid = Grid::from_rows(&["r g", "g r"]).unwrap();
        assert_eq!(find_connected_region(&grid, 0, 0).len(), 1);
    }

    #[test]
    fn test_obstacles_split_regions() {
        let grid = Grid::from_rows(&["r bo r"]).unwrap();
        assert_eq!(find_connected_region(&grid, 0, 0).len(), 1);
    }

    #[test]
    fn test_empty_seed() {
        let grid = Grid::from_rows(&[". r"]).unwrap();
        assert!(find_connected_region(&grid, 0, 0).is_empty());
        assert!(find_connected_region(&grid, 9, 9).is_empty());
    }

    #[test]
    fn test_all_regions_partition_cubes() {
        let grid = Grid::from_rows(&["r r bo", "g r g"]).unwrap();
        let regions = all_regions(&grid);
        let total: usize = regions.iter().map(Vec::len).sum();
        assert_eq!(total, 5);
        assert_eq!(regions.len(), 3);
    }

    #[test]
    fn test_has_valid_move() {
        let stuck = Grid::from_rows(&["r g", "g r"]).unwrap();
        assert!(!has_valid_move(&stuck));
        let rocket = Grid::from_rows(&["r g", "g hro"]).unwrap();
        assert!(has_valid_move(&rocket));
        let pair = Grid::from_rows(&["r r", "g b"]).unwrap();
        assert!(has_valid_move(&pair));
    }
}
