//! Gravity - column compaction and refill
//!
//! Always run [`compact`] before [`refill`]. Box and Stone never move and act
//! as a floor for whatever sits above them: nothing falls through them, and
//! the cells they shelter below are never refilled.

use std::collections::HashMap;

use crate::grid::{Grid, ItemId};
use crate::matching::{all_regions, spawns_special};
use crate::rng::SimpleRng;
use crate::types::Position;

/// One item's movement for the presentation to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallStep {
    pub item: ItemId,
    pub from: Position,
    pub to: Position,
}

/// Pull fallable items down until a full pass moves nothing.
///
/// An item that drops several times across passes yields a single step from
/// its original cell to its final one.
pub fn compact(grid: &mut Grid) -> Vec<FallStep> {
    let mut steps: Vec<FallStep> = Vec::new();
    let mut by_item: HashMap<ItemId, usize> = HashMap::new();

    loop {
        let mut moved = false;
        for x in 0..grid.width() as i8 {
            for y in 0..grid.height() as i8 {
                if !grid.is_empty_at(x, y) {
                    continue;
                }
                let Some(source) = first_fallable_above(grid, x, y) else {
                    continue;
                };
                let to = Position::new(x, y);
                let Some(id) = grid.get_at(source).map(|item| item.id()) else {
                    continue;
                };
                if !grid.move_item(source, to) {
                    continue;
                }
                moved = true;
                match by_item.get(&id) {
                    Some(&idx) => steps[idx].to = to,
                    None => {
                        by_item.insert(id, steps.len());
                        steps.push(FallStep {
                            item: id,
                            from: source,
                            to,
                        });
                    }
                }
            }
        }
        if !moved {
            break;
        }
    }

    tracing::trace!(moved = steps.len(), "compaction settled");
    steps
}

/// Nearest occupied cell above `(x, y)` if it can fall; a fixed obstacle
/// ends the search.
fn first_fallable_above(grid: &Grid, x: i8, y: i8) -> Option<Position> {
    for above in (y + 1)..grid.height() as i8 {
        if let Some(item) = grid.get(x, above) {
            return item.can_fall().then(|| Position::new(x, above));
        }
    }
    None
}

/// Fill every empty cell above the topmost fixed obstacle of each column.
///
/// New cubes enter from above the board: the k-th filled cell of a column
/// (counting from the bottom) starts at `y = height + k`.
pub fn refill(grid: &mut Grid, rng: &mut SimpleRng) -> Vec<FallStep> {
    let height = grid.height() as i8;
    let mut steps = Vec::new();

    for x in 0..grid.width() as i8 {
        let floor = (0..height)
            .rev()
            .find(|&y| grid.get(x, y).is_some_and(|item| !item.can_fall()))
            .map_or(0, |y| y + 1);

        let mut entering: i8 = 0;
        for y in floor..height {
            if !grid.is_empty_at(x, y) {
                continue;
            }
            let kind = rng.cube();
            if let Some(id) = grid.spawn(x, y, kind) {
                steps.push(FallStep {
                    item: id,
                    from: Position::new(x, height.saturating_add(entering)),
                    to: Position::new(x, y),
                });
                entering += 1;
            }
        }
    }

    tracing::trace!(spawned = steps.len(), "refill done");
    steps
}

/// Re-derive the primed flag: cubes in regions of four or more are primed,
/// everything else is not.
pub fn recompute_primed(grid: &mut Grid) {
    for item in grid.items_mut() {
        item.set_primed(false);
    }
    for region in all_regions(grid) {
        if !spawns_special(region.len()) {
            continue;
        }
        for pos in region {
            if let Some(item) = grid.get_mut(pos.x, pos.y) {
                item.set_primed(true);
            }
        }
    }
}

/// True when no empty cell has a fallable item directly reachable above it.
pub fn is_settled(grid: &Grid) -> bool {
    (0..grid.width() as i8).all(|x| {
        (0..grid.height() as i8)
            .all(|y| !grid.is_empty_at(x, y) || first_fallable_above(grid, x, y).is_none())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemKind;

    #[test]
    fn test_compact_drops_to_bottom() {
        let mut grid = Grid::from_rows(&[
            "r", //
            ".", //
            "g", //
            ".", //
        ])
        .unwrap();
        let steps = compact(&mut grid);
        assert_eq!(grid.to_rows(), vec![".", ".", "r", "g"]);
        assert_eq!(steps.len(), 2);
        assert!(is_settled(&grid));
    }

    #[test]
    fn test_fall_step_spans_full_drop() {
        let mut grid = Grid::from_rows(&["r", ".", "."]).unwrap();
        let steps = compact(&mut grid);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].from, Position::new(0, 2));
        assert_eq!(steps[0].to, Position::new(0, 0));
    }

    #[test]
    fn test_box_blocks_items_above() {
        let mut grid = Grid::from_rows(&[
            "r", //
            "bo", //
            ".", //
        ])
        .unwrap();
        let steps = compact(&mut grid);
        assert!(steps.is_empty());
        assert!(grid.get(0, 0).is_none());
        assert!(is_settled(&grid));
    }

    #[test]
    fn test_vase_falls() {
        let mut grid = Grid::from_rows(&["v", "."]).unwrap();
        compact(&mut grid);
        assert_eq!(grid.get(0, 0).unwrap().kind(), ItemKind::Vase);
    }

    #[test]
    fn test_refill_skips_cells_under_fixed_obstacle() {
        let mut grid = Grid::from_rows(&[
            ".", //
            ".", //
            "s", //
            ".", //
        ])
        .unwrap();
        let mut rng = SimpleRng::new(3);
        let steps = refill(&mut grid, &mut rng);
        assert_eq!(steps.len(), 2);
        assert!(grid.get(0, 0).is_none());
        assert!(grid.get(0, 2).unwrap().kind().is_cube());
        assert!(grid.get(0, 3).unwrap().kind().is_cube());
        // Entering from above the board, in order.
        assert_eq!(steps[0].from, Position::new(0, 4));
        assert_eq!(steps[1].from, Position::new(0, 5));
    }

    #[test]
    fn test_compact_then_refill_fills_open_columns() {
        let mut grid = Grid::from_rows(&[
            ". r .", //
            "g . .", //
            ". b y", //
        ])
        .unwrap();
        let mut rng = SimpleRng::new(11);
        compact(&mut grid);
        refill(&mut grid, &mut rng);
        assert!(grid.is_full());
        assert!(is_settled(&grid));
        assert_eq!(grid.get(0, 0).unwrap().kind(), ItemKind::Green);
        assert_eq!(grid.get(1, 0).unwrap().kind(), ItemKind::Blue);
        assert_eq!(grid.get(1, 1).unwrap().kind(), ItemKind::Red);
    }

    #[test]
    fn test_recompute_primed() {
        let mut grid = Grid::from_rows(&[
            "r r g", //
            "r r g", //
        ])
        .unwrap();
        recompute_primed(&mut grid);
        assert!(grid.get(0, 0).unwrap().is_primed());
        assert!(grid.get(1, 1).unwrap().is_primed());
        assert!(!grid.get(2, 0).unwrap().is_primed());

        grid.remove(0, 0);
        recompute_primed(&mut grid);
        assert!(!grid.get(1, 1).unwrap().is_primed());
    }
}
