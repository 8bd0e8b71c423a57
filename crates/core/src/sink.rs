//! Collaborator contracts - presentation, goals and completion handles
//!
//! The board never blocks on the presentation. Callbacks that start an
//! animation return a [`CompletionHandle`]; the board keeps the handle and
//! polls it from `tick` until the presentation fires the matching
//! [`CompletionSignal`]. Dropping a signal counts as completion, so a
//! presentation that goes away can never wedge the board.

use tokio::sync::oneshot;

use crate::goals::Goals;
use crate::grid::Item;
use crate::types::{Position, RocketActivation};

/// Board-side end of an animation handshake.
#[derive(Debug)]
pub struct CompletionHandle {
    rx: Option<oneshot::Receiver<()>>,
}

/// Presentation-side end of an animation handshake.
#[derive(Debug)]
pub struct CompletionSignal {
    tx: oneshot::Sender<()>,
}

impl CompletionHandle {
    /// Already complete; for sinks without animations.
    pub fn ready() -> Self {
        Self { rx: None }
    }

    pub fn pair() -> (CompletionSignal, CompletionHandle) {
        let (tx, rx) = oneshot::channel();
        (CompletionSignal { tx }, CompletionHandle { rx: Some(rx) })
    }

    /// Non-blocking check.
    pub fn is_complete(&mut self) -> bool {
        let Some(rx) = self.rx.as_mut() else {
            return true;
        };
        match rx.try_recv() {
            Ok(()) | Err(oneshot::error::TryRecvError::Closed) => {
                self.rx = None;
                true
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
        }
    }

    /// Wait for completion from async code.
    pub async fn wait(self) {
        if let Some(rx) = self.rx {
            let _ = rx.await;
        }
    }
}

impl CompletionSignal {
    pub fn complete(self) {
        let _ = self.tx.send(());
    }
}

/// Receives model changes in the order they happen and animates them.
///
/// Every method has a no-op default so sinks only implement what they draw.
pub trait PresentationSink {
    /// A blast was rejected on this item.
    fn on_invalid_blast(&mut self, _item: &Item) {}

    /// The item has left the grid.
    fn on_destroy(&mut self, _item: &Item) -> CompletionHandle {
        CompletionHandle::ready()
    }

    /// An obstacle lost health but is still standing.
    fn on_obstacle_damaged(&mut self, _item: &Item) {}

    fn on_special_created(&mut self, _item: &Item) -> CompletionHandle {
        CompletionHandle::ready()
    }

    fn on_special_activated(&mut self, _activation: RocketActivation) {}

    /// The item moved from `from` (possibly above the board) to `to`.
    fn on_fall_step(&mut self, _item: &Item, _from: Position, _to: Position) -> CompletionHandle {
        CompletionHandle::ready()
    }

    /// The board is interactable again.
    fn on_resolution_settled(&mut self) {}
}

/// Receives win/lose bookkeeping.
pub trait GoalSink {
    fn on_goals_updated(&mut self, _goals: &Goals) {}
    fn on_moves_updated(&mut self, _moves_left: i32) {}
    fn on_game_over(&mut self) {}
    fn on_level_cleared(&mut self) {}
}

/// Sink that ignores everything and completes instantly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {}
impl GoalSink for NullSink {}
