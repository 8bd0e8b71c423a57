//! Session runtime - a board driven by a tokio task
//!
//! The board stays synchronous. The session task owns it, applies commands as
//! they arrive and ticks it on a fixed interval; every sink callback becomes a
//! [`Emitted`] message on an unbounded channel. Callbacks that wait on an
//! animation hand the consumer a [`CompletionSignal`] to fire when done.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::core::{
    Board, BoardConfig, CompletionHandle, CompletionSignal, GoalSink, Goals, Item, LevelSource,
    PresentationSink,
};
use crate::protocol::{Command, ErrorCode, Request, SessionEvent};
use crate::types::{Position, RocketActivation, TICK_MS};

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub tick_ms: u64,
    pub levels_dir: PathBuf,
    /// Level loaded when the session starts.
    pub level: u32,
    /// How long the stdin runner lets each animation play.
    pub animation_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS as u64,
            levels_dir: PathBuf::from("levels"),
            level: 1,
            animation_ms: 0,
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let tick_ms = env::var("BLAST_TICK_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(defaults.tick_ms);

        let levels_dir = env::var("BLAST_LEVELS_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.levels_dir);

        let level = env::var("BLAST_LEVEL")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.level);

        let animation_ms = env::var("BLAST_ANIMATION_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.animation_ms);

        Self {
            tick_ms,
            levels_dir,
            level,
            animation_ms,
        }
    }
}

/// One outbound event, with the signal its animation must fire if any.
#[derive(Debug)]
pub struct Emitted {
    pub event: SessionEvent,
    pub completion: Option<CompletionSignal>,
}

impl Emitted {
    /// Fire the completion signal after `delay`, on a spawned task.
    pub fn complete_after(&mut self, delay: Duration) {
        let Some(signal) = self.completion.take() else {
            return;
        };
        if delay.is_zero() {
            signal.complete();
            return;
        }
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            signal.complete();
        });
    }
}

type EventTx = mpsc::UnboundedSender<Emitted>;

fn emit(tx: &EventTx, event: SessionEvent) {
    let _ = tx.send(Emitted {
        event,
        completion: None,
    });
}

/// Emit an event that blocks the board until the consumer completes it.
///
/// A closed channel drops the signal, which the board reads as complete.
fn emit_awaited(tx: &EventTx, event: SessionEvent) -> CompletionHandle {
    let (signal, handle) = CompletionHandle::pair();
    let _ = tx.send(Emitted {
        event,
        completion: Some(signal),
    });
    handle
}

/// Presentation sink that forwards to a channel.
#[derive(Debug, Clone)]
pub struct ChannelPresentation {
    tx: EventTx,
}

impl ChannelPresentation {
    pub fn new(tx: EventTx) -> Self {
        Self { tx }
    }
}

impl PresentationSink for ChannelPresentation {
    fn on_invalid_blast(&mut self, item: &Item) {
        emit(&self.tx, SessionEvent::InvalidBlast { item: item.into() });
    }

    fn on_destroy(&mut self, item: &Item) -> CompletionHandle {
        emit_awaited(&self.tx, SessionEvent::Destroyed { item: item.into() })
    }

    fn on_obstacle_damaged(&mut self, item: &Item) {
        emit(&self.tx, SessionEvent::ObstacleDamaged { item: item.into() });
    }

    fn on_special_created(&mut self, item: &Item) -> CompletionHandle {
        emit_awaited(&self.tx, SessionEvent::SpecialCreated { item: item.into() })
    }

    fn on_special_activated(&mut self, activation: RocketActivation) {
        emit(&self.tx, SessionEvent::activated(activation));
    }

    fn on_fall_step(&mut self, item: &Item, from: Position, to: Position) -> CompletionHandle {
        emit_awaited(&self.tx, SessionEvent::fall_step(item, from, to))
    }

    fn on_resolution_settled(&mut self) {
        emit(&self.tx, SessionEvent::Settled);
    }
}

/// Goal sink that forwards to a channel.
#[derive(Debug, Clone)]
pub struct ChannelGoals {
    tx: EventTx,
}

impl ChannelGoals {
    pub fn new(tx: EventTx) -> Self {
        Self { tx }
    }
}

impl GoalSink for ChannelGoals {
    fn on_goals_updated(&mut self, goals: &Goals) {
        emit(&self.tx, SessionEvent::goals(goals));
    }

    fn on_moves_updated(&mut self, moves_left: i32) {
        emit(&self.tx, SessionEvent::MovesUpdated { moves_left });
    }

    fn on_game_over(&mut self) {
        emit(&self.tx, SessionEvent::GameOver);
    }

    fn on_level_cleared(&mut self) {
        emit(&self.tx, SessionEvent::LevelCleared);
    }
}

pub type SessionBoard = Board<ChannelPresentation, ChannelGoals>;

/// A board plus the channel its replies go out on.
pub struct Session {
    board: SessionBoard,
    tx: EventTx,
}

impl Session {
    pub fn new(
        board_config: BoardConfig,
        source: impl LevelSource + Send + 'static,
        tx: EventTx,
    ) -> Self {
        let board = Board::new(
            board_config,
            source,
            ChannelPresentation::new(tx.clone()),
            ChannelGoals::new(tx.clone()),
        );
        Self { board, tx }
    }

    pub fn board(&self) -> &SessionBoard {
        &self.board
    }

    pub fn tick(&mut self, elapsed_ms: u32) {
        self.board.tick(elapsed_ms);
    }

    /// Apply one request and reply with an ack, an error or an observation.
    pub fn handle(&mut self, request: Request) {
        let Request { seq, command } = request;
        tracing::debug!(seq, command = command.name(), "request");

        let accepted = match command {
            Command::Blast { x, y } => self.board.try_blast(x, y),
            Command::Activate { x, y } => self.board.try_activate(x, y),
            Command::Chain { x, y } => self.board.chain_activate(x, y),
            Command::Reset { level } => match self.board.reset(level) {
                Ok(()) => true,
                Err(err) => {
                    emit(
                        &self.tx,
                        SessionEvent::Error {
                            seq,
                            code: ErrorCode::LevelLoad,
                            message: err.to_string(),
                        },
                    );
                    return;
                }
            },
            Command::Observe => {
                emit(
                    &self.tx,
                    SessionEvent::Observation {
                        board: self.board.snapshot(),
                    },
                );
                return;
            }
        };

        emit(
            &self.tx,
            SessionEvent::Ack {
                seq,
                command: command.name(),
                accepted,
            },
        );
    }
}

/// Run a session until the command channel closes.
///
/// The starting level must load; later `reset` failures are reported as
/// error events instead.
pub async fn run_session(
    config: SessionConfig,
    board_config: BoardConfig,
    source: impl LevelSource + Send + 'static,
    mut commands: mpsc::Receiver<Request>,
    events: EventTx,
) -> anyhow::Result<()> {
    let mut session = Session::new(board_config, source, events);
    session
        .board
        .reset(config.level)
        .with_context(|| format!("failed to load level {}", config.level))?;
    tracing::info!(level = config.level, tick_ms = config.tick_ms, "session started");

    let mut interval = tokio::time::interval(Duration::from_millis(config.tick_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            now = interval.tick() => {
                let elapsed = now.saturating_duration_since(last_tick).as_millis();
                last_tick = now;
                session.tick(u32::try_from(elapsed).unwrap_or(u32::MAX));
            }
            request = commands.recv() => {
                match request {
                    Some(request) => session.handle(request),
                    None => break,
                }
            }
        }
    }

    tracing::info!("session closed");
    Ok(())
}

/// Handles to a session spawned on the current runtime.
pub struct SessionHandle {
    pub commands: mpsc::Sender<Request>,
    pub events: mpsc::UnboundedReceiver<Emitted>,
    pub task: JoinHandle<anyhow::Result<()>>,
}

/// Spawn [`run_session`] on the current tokio runtime.
pub fn spawn_session(
    config: SessionConfig,
    board_config: BoardConfig,
    source: impl LevelSource + Send + 'static,
) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel::<Request>(64);
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Emitted>();
    let task = tokio::spawn(run_session(config, board_config, source, cmd_rx, event_tx));
    SessionHandle {
        commands: cmd_tx,
        events: event_rx,
        task,
    }
}
