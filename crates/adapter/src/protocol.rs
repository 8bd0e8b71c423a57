//! Protocol module - JSON message types for the session runtime
//!
//! Line-delimited JSON. Requests carry an optional `seq` that is echoed in the
//! matching `ack` or `error`; events pushed by the board carry no `seq`.

use serde::{Deserialize, Serialize};

use crate::core::{BoardSnapshot, GoalEntry, Goals, Item};
use crate::types::{Position, RocketActivation};

// ============== Client -> Session ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Blast { x: i8, y: i8 },
    Activate { x: i8, y: i8 },
    /// Projectile hit reported by the presentation.
    Chain { x: i8, y: i8 },
    Reset { level: u32 },
    Observe,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Blast { .. } => "blast",
            Command::Activate { .. } => "activate",
            Command::Chain { .. } => "chain",
            Command::Reset { .. } => "reset",
            Command::Observe => "observe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub seq: u64,
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    pub fn new(seq: u64, command: Command) -> Self {
        Self { seq, command }
    }
}

pub fn parse_request(line: &str) -> serde_json::Result<Request> {
    serde_json::from_str(line.trim())
}

// ============== Session -> Client ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    LevelLoad,
}

/// Item fields shared by the per-item events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemInfo {
    pub id: u32,
    pub kind: &'static str,
    pub x: i8,
    pub y: i8,
    pub health: u8,
}

impl From<&Item> for ItemInfo {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id().get(),
            kind: item.kind().as_str(),
            x: item.x(),
            y: item.y(),
            health: item.health(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Ack {
        seq: u64,
        command: &'static str,
        accepted: bool,
    },
    Error {
        seq: u64,
        code: ErrorCode,
        message: String,
    },
    InvalidBlast {
        item: ItemInfo,
    },
    Destroyed {
        item: ItemInfo,
    },
    ObstacleDamaged {
        item: ItemInfo,
    },
    SpecialCreated {
        item: ItemInfo,
    },
    SpecialActivated {
        x: i8,
        y: i8,
        direction: &'static str,
    },
    FallStep {
        item: ItemInfo,
        from: [i8; 2],
        to: [i8; 2],
    },
    Settled,
    GoalsUpdated {
        goals: Vec<GoalEntry>,
    },
    MovesUpdated {
        moves_left: i32,
    },
    GameOver,
    LevelCleared,
    Observation {
        board: BoardSnapshot,
    },
}

impl SessionEvent {
    pub fn activated(activation: RocketActivation) -> Self {
        SessionEvent::SpecialActivated {
            x: activation.origin.x,
            y: activation.origin.y,
            direction: activation.direction.as_str(),
        }
    }

    pub fn fall_step(item: &Item, from: Position, to: Position) -> Self {
        SessionEvent::FallStep {
            item: item.into(),
            from: [from.x, from.y],
            to: [to.x, to.y],
        }
    }

    pub fn goals(goals: &Goals) -> Self {
        SessionEvent::GoalsUpdated {
            goals: goals.entries(),
        }
    }

    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
