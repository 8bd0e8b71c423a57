//! Goal counters - remaining obstacles per kind
//!
//! Counters are never decremented by hand: they are re-derived from the grid
//! after every resolution, which keeps them equal to the live obstacle count.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::grid::Grid;
use crate::types::ItemKind;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Goals {
    remaining: BTreeMap<ItemKind, u32>,
}

impl Goals {
    /// Track every obstacle kind present on a freshly populated grid.
    pub fn from_grid(grid: &Grid) -> Self {
        let mut remaining = BTreeMap::new();
        for kind in ItemKind::OBSTACLES {
            let count = grid.count_kind(kind) as u32;
            if count > 0 {
                remaining.insert(kind, count);
            }
        }
        Self { remaining }
    }

    /// Recount the tracked kinds.
    pub fn recount(&mut self, grid: &Grid) {
        for (kind, count) in self.remaining.iter_mut() {
            *count = grid.count_kind(*kind) as u32;
        }
    }

    /// Remaining count, `None` when the kind is not a goal of this level.
    pub fn remaining(&self, kind: ItemKind) -> Option<u32> {
        self.remaining.get(&kind).copied()
    }

    pub fn total(&self) -> u32 {
        self.remaining.values().sum()
    }

    pub fn is_complete(&self) -> bool {
        self.total() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        self.remaining.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Serializable form for snapshots and wire events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalEntry {
    pub kind: &'static str,
    pub remaining: u32,
}

impl Goals {
    pub fn entries(&self) -> Vec<GoalEntry> {
        self.iter()
            .map(|(kind, remaining)| GoalEntry {
                kind: kind.as_str(),
                remaining,
            })
            .collect()
    }
}
