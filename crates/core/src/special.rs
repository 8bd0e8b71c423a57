//! Special items - rocket creation, activation, combos and line sweeps
//!
//! A [`Cascade`] holds everything one player action may touch: the lines
//! already swept and the obstacles already hit. Each line is swept at most
//! once per cascade, which bounds chain reactions to `width + height` sweeps no
//! matter how many rockets sit on the board.

use std::collections::{HashSet, VecDeque};

use crate::grid::{Grid, Item};
use crate::obstacles::{damage_direct, ObstacleHit};
use crate::rng::SimpleRng;
use crate::types::{Direction, ItemKind, Position, RocketActivation, ORTHOGONAL};

/// Footprint of a combo (two or more adjacent specials).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComboShape {
    /// One row and one column through the activated cell.
    #[default]
    Cross,
    /// Three rows and three columns centered on the activated cell.
    Wide,
}

impl ComboShape {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cross" => Some(ComboShape::Cross),
            "wide" | "3x3" => Some(ComboShape::Wide),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComboShape::Cross => "cross",
            ComboShape::Wide => "wide",
        }
    }
}

/// Pick the special left behind by a large blast.
pub fn random_special(rng: &mut SimpleRng) -> ItemKind {
    rng.direction().rocket_kind()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Line {
    Row(i8),
    Column(i8),
}

impl Line {
    fn of(activation: &RocketActivation) -> Self {
        match activation.direction {
            Direction::Horizontal => Line::Row(activation.origin.y),
            Direction::Vertical => Line::Column(activation.origin.x),
        }
    }
}

/// Model-side effects of a cascade, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeEvent {
    Activated(RocketActivation),
    /// Item removed from the grid (cube, special or broken obstacle).
    Destroyed(Item),
    /// Obstacle hit but still standing.
    Damaged(Item),
}

#[derive(Debug, Default)]
pub struct Cascade {
    swept: HashSet<Line>,
    processed: HashSet<Position>,
    /// Specials a sweep destroyed whose projectile hit is not yet reported.
    unconfirmed: HashSet<Position>,
    queue: VecDeque<RocketActivation>,
    activations: usize,
}

impl Cascade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rocket activations emitted so far.
    pub fn activations(&self) -> usize {
        self.activations
    }

    /// Player activation of the special at `(x, y)`.
    ///
    /// Returns `None` (and leaves the grid untouched) when the cell does not
    /// hold a special.
    pub fn activate(
        &mut self,
        grid: &mut Grid,
        x: i8,
        y: i8,
        shape: ComboShape,
    ) -> Option<Vec<CascadeEvent>> {
        let direction = grid.get(x, y)?.kind().direction()?;
        let origin = Position::new(x, y);
        let partners: Vec<Position> = grid
            .neighbors(origin)
            .into_iter()
            .filter(|n| grid.get_at(*n).is_some_and(|i| i.kind().is_special()))
            .collect();

        let mut events = Vec::new();
        if let Some(item) = grid.remove(x, y) {
            events.push(CascadeEvent::Destroyed(item));
        }

        if partners.is_empty() {
            self.enqueue(RocketActivation { origin, direction }, &mut events);
        } else {
            for p in &partners {
                if let Some(item) = grid.remove(p.x, p.y) {
                    events.push(CascadeEvent::Destroyed(item));
                }
            }
            tracing::debug!(x, y, partners = partners.len(), shape = shape.as_str(), "combo");
            for direction in [Direction::Horizontal, Direction::Vertical] {
                self.enqueue(RocketActivation { origin, direction }, &mut events);
            }
            if shape == ComboShape::Wide {
                // Diagonal cells of the 3x3 sit on lines the neighbors already cover.
                for (dx, dy) in ORTHOGONAL {
                    let Some(cell) = origin.offset(dx, dy) else {
                        continue;
                    };
                    if !grid.within_bounds(cell.x, cell.y) {
                        continue;
                    }
                    let direction = if dx != 0 {
                        Direction::Vertical
                    } else {
                        Direction::Horizontal
                    };
                    self.enqueue(RocketActivation { origin: cell, direction }, &mut events);
                }
            }
        }

        self.run(grid, &mut events);
        Some(events)
    }

    /// Accept a projectile hit on `(x, y)` reported after the fact.
    ///
    /// Only specials this cascade destroyed on one of its swept lines count,
    /// each once. The grid is never touched.
    pub fn confirm_hit(&mut self, x: i8, y: i8) -> bool {
        let on_path = self.swept.contains(&Line::Row(y)) || self.swept.contains(&Line::Column(x));
        on_path && self.unconfirmed.remove(&Position::new(x, y))
    }

    fn enqueue(&mut self, activation: RocketActivation, events: &mut Vec<CascadeEvent>) {
        if !self.swept.insert(Line::of(&activation)) {
            return;
        }
        self.activations += 1;
        self.queue.push_back(activation);
        events.push(CascadeEvent::Activated(activation));
    }

    fn run(&mut self, grid: &mut Grid, events: &mut Vec<CascadeEvent>) {
        while let Some(activation) = self.queue.pop_front() {
            self.sweep(grid, activation, events);
        }
    }

    /// Clear the line of `activation`, working outward from its origin.
    fn sweep(&mut self, grid: &mut Grid, activation: RocketActivation, events: &mut Vec<CascadeEvent>) {
        let origin = activation.origin;
        let (dx, dy) = match activation.direction {
            Direction::Horizontal => (1, 0),
            Direction::Vertical => (0, 1),
        };
        let span = grid.width().max(grid.height()) as i8;

        self.strike(grid, origin, events);
        for step in 1..=span {
            for sign in [-1, 1] {
                if let Some(cell) = origin.offset(dx * step * sign, dy * step * sign) {
                    self.strike(grid, cell, events);
                }
            }
        }
    }

    fn strike(&mut self, grid: &mut Grid, cell: Position, events: &mut Vec<CascadeEvent>) {
        let Some(item) = grid.get_at(cell) else {
            return;
        };
        let kind = item.kind();

        if kind.is_obstacle() {
            match damage_direct(grid, cell, &mut self.processed) {
                Some(ObstacleHit::Damaged(item)) => events.push(CascadeEvent::Damaged(item)),
                Some(ObstacleHit::Destroyed(item)) => events.push(CascadeEvent::Destroyed(item)),
                None => {}
            }
            return;
        }

        if let Some(item) = grid.remove(cell.x, cell.y) {
            events.push(CascadeEvent::Destroyed(item));
        }
        if let Some(direction) = kind.direction() {
            tracing::trace!(x = cell.x, y = cell.y, "chained rocket");
            self.unconfirmed.insert(cell);
            self.enqueue(RocketActivation { origin: cell, direction }, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activations(events: &[CascadeEvent]) -> Vec<RocketActivation> {
        events
            .iter()
            .filter_map(|e| match e {
                CascadeEvent::Activated(a) => Some(*a),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_rocket_clears_its_row() {
        let mut grid = Grid::from_rows(&[
            "g g g g", //
            "r hro b y", //
        ])
        .unwrap();
        let mut cascade = Cascade::new();
        let events = cascade.activate(&mut grid, 1, 0, ComboShape::Cross).unwrap();

        assert_eq!(
            activations(&events),
            vec![RocketActivation {
                origin: Position::new(1, 0),
                direction: Direction::Horizontal
            }]
        );
        for x in 0..4 {
            assert!(grid.get(x, 0).is_none());
            assert!(grid.get(x, 1).is_some());
        }
    }

    #[test]
    fn test_activate_non_special_is_none() {
        let mut grid = Grid::from_rows(&["r bo"]).unwrap();
        let mut cascade = Cascade::new();
        assert!(cascade.activate(&mut grid, 0, 0, ComboShape::Cross).is_none());
        assert!(cascade.activate(&mut grid, 1, 0, ComboShape::Cross).is_none());
        assert!(cascade.activate(&mut grid, 5, 0, ComboShape::Cross).is_none());
        assert_eq!(grid.items().count(), 2);
    }

    #[test]
    fn test_combo_fires_both_directions() {
        let mut grid = Grid::from_rows(&[
            "r g b y r", //
            "g b y r g", //
            "b y hro vro b", //
            "y r g b y", //
            "r g b y r", //
        ])
        .unwrap();
        let mut cascade = Cascade::new();
        let events = cascade.activate(&mut grid, 2, 2, ComboShape::Cross).unwrap();

        let fired = activations(&events);
        assert_eq!(fired.len(), 2);
        assert!(fired.iter().all(|a| a.origin == Position::new(2, 2)));
        assert!(fired.iter().any(|a| a.direction == Direction::Horizontal));
        assert!(fired.iter().any(|a| a.direction == Direction::Vertical));

        for i in 0..5 {
            assert!(grid.get(i, 2).is_none(), "row cell {} survived", i);
            assert!(grid.get(2, i).is_none(), "column cell {} survived", i);
        }
        // Off-cross cells untouched.
        assert_eq!(grid.items().count(), 25 - 9);
    }

    #[test]
    fn test_wide_combo_sweeps_three_lines_each_way() {
        let mut grid = Grid::from_rows(&[
            "r g b y r", //
            "g b y r g", //
            "b y hro hro b", //
            "y r g b y", //
            "r g b y r", //
        ])
        .unwrap();
        let mut cascade = Cascade::new();
        let events = cascade.activate(&mut grid, 2, 2, ComboShape::Wide).unwrap();

        let fired = activations(&events);
        // Center H+V, plus one per orthogonal neighbor.
        assert_eq!(fired.len(), 6);
        let lines: HashSet<Line> = fired.iter().map(Line::of).collect();
        assert_eq!(lines.len(), fired.len());

        for y in 1..=3 {
            for x in 0..5 {
                assert!(grid.get(x, y).is_none());
            }
        }
        for x in 1..=3 {
            for y in 0..5 {
                assert!(grid.get(x, y).is_none());
            }
        }
        assert_eq!(grid.items().count(), 4);
    }

    #[test]
    fn test_chain_reaction_is_bounded() {
        // Every cell is a rocket: the cascade still sweeps each line once.
        let mut grid = Grid::from_rows(&[
            "hro vro hro", //
            "vro hro vro", //
            "hro vro hro", //
        ])
        .unwrap();
        let mut cascade = Cascade::new();
        let events = cascade.activate(&mut grid, 0, 0, ComboShape::Cross).unwrap();
        let fired = activations(&events);
        assert!(fired.len() <= 6, "fired {}", fired.len());
        let lines: HashSet<Line> = fired.iter().map(Line::of).collect();
        assert_eq!(lines.len(), fired.len());
    }

    #[test]
    fn test_confirm_hit_only_for_struck_specials() {
        let mut grid = Grid::from_rows(&[
            "g b g vro", //
            "b g b g", //
            "g b g b", //
            "hro g vro g", //
        ])
        .unwrap();
        let mut cascade = Cascade::new();
        cascade.activate(&mut grid, 0, 0, ComboShape::Cross).unwrap();

        // The row sweep destroyed the rocket at (2,0).
        assert!(grid.get(2, 0).is_none());
        assert!(cascade.confirm_hit(2, 0));
        assert!(!cascade.confirm_hit(2, 0), "each hit counts once");

        // The player's own rocket and cells off the path are not hits.
        assert!(!cascade.confirm_hit(0, 0));
        assert!(!cascade.confirm_hit(3, 3));
        assert!(grid.get(3, 3).is_some());
        assert!(!cascade.confirm_hit(1, 0), "cube, not a special");
    }

    #[test]
    fn test_sweep_hits_obstacles_once() {
        let mut grid = Grid::from_rows(&["v hro s bo"]).unwrap();
        let mut cascade = Cascade::new();
        cascade.activate(&mut grid, 1, 0, ComboShape::Cross).unwrap();

        let vase = grid.get(0, 0).unwrap();
        assert_eq!(vase.health(), 1);
        assert!(grid.get(2, 0).is_none(), "stone breaks under a rocket");
        assert!(grid.get(3, 0).is_none());
    }

    #[test]
    fn test_combo_shape_parse() {
        assert_eq!(ComboShape::from_str("Cross"), Some(ComboShape::Cross));
        assert_eq!(ComboShape::from_str("wide"), Some(ComboShape::Wide));
        assert_eq!(ComboShape::from_str("3x3"), Some(ComboShape::Wide));
        assert_eq!(ComboShape::from_str("ring"), None);
    }
}
