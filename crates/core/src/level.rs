//! Level data - JSON records, validation and level sources
//!
//! Level files follow this layout:
//!
//! ```json
//! {
//!   "level_number": 1,
//!   "grid_width": 3,
//!   "grid_height": 2,
//!   "move_count": 20,
//!   "grid": ["r", "rand", "bo", "g", "v", "s"]
//! }
//! ```
//!
//! `grid` is row-major with the bottom row first. A [`Level`] only exists once
//! every check has passed, so a board never starts from partial data.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{LevelCell, MAX_BOARD_DIMENSION};

#[derive(Debug, Error)]
pub enum LevelDataError {
    #[error("level {0} not found")]
    NotFound(u32),
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid dimensions {width}x{height} (each must be within 1..=64)")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("grid has {actual} cells, expected {expected}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("unknown cell {value:?} at index {index}")]
    UnknownCell { index: usize, value: String },
    #[error("move budget must be positive, got {0}")]
    InvalidMoveBudget(i64),
}

/// Raw level record as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    pub level_number: u32,
    pub grid_width: i64,
    pub grid_height: i64,
    pub move_count: i64,
    pub grid: Vec<String>,
}

/// A validated level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub id: u32,
    pub width: u8,
    pub height: u8,
    pub move_budget: u32,
    /// Row-major, bottom row first.
    pub layout: Vec<LevelCell>,
}

impl Level {
    pub fn from_json(json: &str) -> Result<Self, LevelDataError> {
        let data: LevelData = serde_json::from_str(json)?;
        Self::try_from(data)
    }

    /// Cell at `(x, y)` of the layout.
    pub fn cell(&self, x: u8, y: u8) -> Option<LevelCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.layout
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Back to the on-disk record.
    pub fn to_data(&self) -> LevelData {
        LevelData {
            level_number: self.id,
            grid_width: self.width as i64,
            grid_height: self.height as i64,
            move_count: self.move_budget as i64,
            grid: self
                .layout
                .iter()
                .map(|cell| cell.as_str().to_string())
                .collect(),
        }
    }
}

impl TryFrom<LevelData> for Level {
    type Error = LevelDataError;

    fn try_from(data: LevelData) -> Result<Self, Self::Error> {
        let max = MAX_BOARD_DIMENSION as i64;
        if !(1..=max).contains(&data.grid_width) || !(1..=max).contains(&data.grid_height) {
            return Err(LevelDataError::InvalidDimensions {
                width: data.grid_width,
                height: data.grid_height,
            });
        }
        let width = data.grid_width as u8;
        let height = data.grid_height as u8;

        let expected = width as usize * height as usize;
        if data.grid.len() != expected {
            return Err(LevelDataError::CellCountMismatch {
                expected,
                actual: data.grid.len(),
            });
        }

        let layout = data
            .grid
            .iter()
            .enumerate()
            .map(|(index, value)| {
                LevelCell::from_str(value).ok_or_else(|| LevelDataError::UnknownCell {
                    index,
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let move_budget = u32::try_from(data.move_count)
            .ok()
            .filter(|m| *m > 0)
            .ok_or(LevelDataError::InvalidMoveBudget(data.move_count))?;

        Ok(Self {
            id: data.level_number,
            width,
            height,
            move_budget,
            layout,
        })
    }
}

/// Where the board gets its levels from.
pub trait LevelSource {
    fn load(&self, level_id: u32) -> Result<Level, LevelDataError>;
}

/// Loads `level_NN.json` files from a directory.
#[derive(Debug, Clone)]
pub struct DirLevelSource {
    dir: PathBuf,
}

impl DirLevelSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, level_id: u32) -> PathBuf {
        self.dir.join(format!("level_{:02}.json", level_id))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LevelSource for DirLevelSource {
    fn load(&self, level_id: u32) -> Result<Level, LevelDataError> {
        let path = self.path_for(level_id);
        let text = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LevelDataError::NotFound(level_id)
            } else {
                LevelDataError::Io { path, source }
            }
        })?;
        Level::from_json(&text)
    }
}

/// In-memory levels, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryLevelSource {
    levels: HashMap<u32, Level>,
}

impl MemoryLevelSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.insert(level);
        self
    }

    pub fn insert(&mut self, level: Level) {
        self.levels.insert(level.id, level);
    }
}

impl LevelSource for MemoryLevelSource {
    fn load(&self, level_id: u32) -> Result<Level, LevelDataError> {
        self.levels
            .get(&level_id)
            .cloned()
            .ok_or(LevelDataError::NotFound(level_id))
    }
}
