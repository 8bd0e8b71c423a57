//! Board state machine - the only mutating entry point
//!
//! A player action runs its whole resolution synchronously (match or
//! activation, obstacle damage, removals, special creation, move spend, goal
//! recount) and leaves the board in `Processing`. Everything after that is
//! driven by [`Board::tick`]:
//!
//! 1. wait until every destroy handle of the batch has completed and the
//!    chain debounce (armed by activations only) has run out;
//! 2. announce a freshly created special and wait for its handle;
//! 3. enter `GameOver` if the move counter went negative, otherwise compact,
//!    refill and enter `Falling`;
//! 4. once every fall handle has completed, return to `Ready`.
//!
//! Removed items are gone from the grid before any handle is handed out, so
//! nothing still on screen can be matched or fall.

use std::collections::HashSet;

use crate::config::BoardConfig;
use crate::goals::Goals;
use crate::gravity::{compact, recompute_primed, refill};
use crate::grid::{Grid, ItemId};
use crate::level::{Level, LevelDataError, LevelSource};
use crate::matching::{find_connected_region, is_valid_blast, spawns_special};
use crate::obstacles::{damage_adjacent, ObstacleHit};
use crate::rng::SimpleRng;
use crate::sink::{CompletionHandle, GoalSink, PresentationSink};
use crate::snapshot::BoardSnapshot;
use crate::special::{random_special, Cascade, CascadeEvent};
use crate::types::{BoardState, LevelCell};

/// Everything an accepted action leaves behind until gravity may run.
#[derive(Debug, Default)]
struct Resolution {
    pending: Vec<CompletionHandle>,
    /// Remaining quiet time before the cascade counts as finished.
    debounce_ms: Option<u32>,
    /// Special created by this blast, announced once the batch is gone.
    special: Option<ItemId>,
    /// Open activation cascade, kept to validate reported projectile hits.
    cascade: Option<Cascade>,
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Idle,
    Resolving(Resolution),
    Falling(Vec<CompletionHandle>),
}

pub struct Board<P, G> {
    grid: Grid,
    state: BoardState,
    phase: Phase,
    rng: SimpleRng,
    config: BoardConfig,
    moves_left: i32,
    goals: Goals,
    level_id: Option<u32>,
    loaded: bool,
    cleared: bool,
    source: Box<dyn LevelSource + Send>,
    presentation: P,
    goal_sink: G,
}

impl<P: PresentationSink, G: GoalSink> Board<P, G> {
    /// Create an empty board. Nothing is playable until [`Board::reset`] or
    /// [`Board::load_grid`] succeeds.
    pub fn new(
        config: BoardConfig,
        source: impl LevelSource + Send + 'static,
        presentation: P,
        goal_sink: G,
    ) -> Self {
        Self {
            grid: Grid::new(1, 1),
            state: BoardState::Ready,
            phase: Phase::Idle,
            rng: SimpleRng::new(config.seed),
            config,
            moves_left: 0,
            goals: Goals::default(),
            level_id: None,
            loaded: false,
            cleared: false,
            source: Box::new(source),
            presentation,
            goal_sink,
        }
    }

    /// Load `level_id` from the level source and start it.
    ///
    /// On error the current grid and state are left untouched.
    pub fn reset(&mut self, level_id: u32) -> Result<(), LevelDataError> {
        let level = self.source.load(level_id).map_err(|err| {
            tracing::warn!(level_id, error = %err, "level load rejected");
            err
        })?;
        self.load_level(&level);
        Ok(())
    }

    /// Populate the board from an already validated level.
    pub fn load_level(&mut self, level: &Level) {
        let mut grid = Grid::new(level.width, level.height);
        for y in 0..level.height {
            for x in 0..level.width {
                let kind = match level.cell(x, y) {
                    Some(LevelCell::Item(kind)) => kind,
                    Some(LevelCell::RandomCube) => self.rng.cube(),
                    None => continue,
                };
                grid.spawn(x as i8, y as i8, kind);
            }
        }
        self.start(grid, level.move_budget, Some(level.id));
    }

    /// Start from a hand-built grid, for fixtures and tools.
    pub fn load_grid(&mut self, grid: Grid, move_budget: u32) {
        self.start(grid, move_budget, None);
    }

    fn start(&mut self, mut grid: Grid, move_budget: u32, level_id: Option<u32>) {
        recompute_primed(&mut grid);
        self.goals = Goals::from_grid(&grid);
        self.grid = grid;
        self.phase = Phase::Idle;
        self.state = BoardState::Ready;
        self.moves_left = i32::try_from(move_budget).unwrap_or(i32::MAX);
        self.level_id = level_id;
        self.loaded = true;
        self.cleared = false;

        tracing::debug!(
            level = ?level_id,
            width = self.grid.width(),
            height = self.grid.height(),
            moves = self.moves_left,
            "level started"
        );
        self.goal_sink.on_goals_updated(&self.goals);
        self.goal_sink.on_moves_updated(self.moves_left);
    }

    /// True when a player action would be considered.
    pub fn is_interactable(&self) -> bool {
        self.loaded
            && !self.cleared
            && self.state == BoardState::Ready
            && matches!(self.phase, Phase::Idle)
    }

    /// Blast the region containing `(x, y)`.
    ///
    /// Returns false without touching the grid when the board is busy, the
    /// cell is empty or out of bounds, the cell is an obstacle, or the region
    /// is a single cube. A special is activated instead of blasted.
    pub fn try_blast(&mut self, x: i8, y: i8) -> bool {
        if !self.is_interactable() {
            tracing::trace!(x, y, state = self.state.as_str(), "blast rejected: busy");
            return false;
        }
        let Some(item) = self.grid.get(x, y) else {
            return false;
        };
        let kind = item.kind();
        if kind.is_special() {
            return self.try_activate(x, y);
        }
        if kind.is_obstacle() {
            self.presentation.on_invalid_blast(item);
            return false;
        }

        let region = find_connected_region(&self.grid, x, y);
        if !is_valid_blast(region.len()) {
            self.presentation.on_invalid_blast(item);
            return false;
        }

        self.state = BoardState::Processing;
        tracing::debug!(x, y, kind = kind.as_str(), size = region.len(), "blast accepted");

        let mut pending = Vec::with_capacity(region.len());
        let mut processed = HashSet::new();
        for hit in damage_adjacent(&mut self.grid, &region, &mut processed) {
            match hit {
                ObstacleHit::Damaged(item) => self.presentation.on_obstacle_damaged(&item),
                ObstacleHit::Destroyed(item) => pending.push(self.presentation.on_destroy(&item)),
            }
        }
        for pos in &region {
            if let Some(item) = self.grid.remove(pos.x, pos.y) {
                pending.push(self.presentation.on_destroy(&item));
            }
        }

        let special = if spawns_special(region.len()) {
            let kind = random_special(&mut self.rng);
            tracing::debug!(x, y, kind = kind.as_str(), "special created");
            self.grid.spawn(x, y, kind)
        } else {
            None
        };

        self.spend_move();
        self.phase = Phase::Resolving(Resolution {
            pending,
            debounce_ms: None,
            special,
            cascade: None,
        });
        true
    }

    /// Fire the special at `(x, y)`, combining with adjacent specials.
    ///
    /// Empty or out-of-bounds cells are ignored; any other non-special item
    /// gets the invalid feedback.
    pub fn try_activate(&mut self, x: i8, y: i8) -> bool {
        if !self.is_interactable() {
            tracing::trace!(x, y, state = self.state.as_str(), "activation rejected: busy");
            return false;
        }
        let Some(item) = self.grid.get(x, y) else {
            return false;
        };
        if !item.kind().is_special() {
            self.presentation.on_invalid_blast(item);
            return false;
        }

        self.state = BoardState::Processing;
        let mut cascade = Cascade::new();
        let Some(events) = cascade.activate(&mut self.grid, x, y, self.config.combo_shape) else {
            self.state = BoardState::Ready;
            return false;
        };
        tracing::debug!(x, y, fired = cascade.activations(), "activation accepted");

        let mut pending = Vec::new();
        Self::dispatch(&mut self.presentation, events, &mut pending);
        self.spend_move();
        self.phase = Phase::Resolving(Resolution {
            pending,
            debounce_ms: self.debounce_window(),
            special: None,
            cascade: Some(cascade),
        });
        true
    }

    /// The presentation's projectile reached the special at `(x, y)`.
    ///
    /// Accepted only while an activation cascade is open and only for a
    /// special that cascade destroyed on one of its swept lines, once each.
    /// The grid is left alone; the report costs no move and re-arms the
    /// debounce so the cascade stays open while projectiles are in flight.
    pub fn chain_activate(&mut self, x: i8, y: i8) -> bool {
        let window = self.debounce_window();
        let Phase::Resolving(resolution) = &mut self.phase else {
            return false;
        };
        if resolution.debounce_ms.is_none() {
            return false;
        }
        let Some(cascade) = resolution.cascade.as_mut() else {
            return false;
        };
        if !cascade.confirm_hit(x, y) {
            tracing::trace!(x, y, "chain hit rejected");
            return false;
        }
        tracing::debug!(x, y, "chain hit confirmed");
        resolution.debounce_ms = window;
        true
    }

    /// Advance timers and poll completion handles.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if let Phase::Resolving(resolution) = &mut self.phase {
            resolution.debounce_ms = resolution
                .debounce_ms
                .and_then(|left| left.checked_sub(elapsed_ms).filter(|ms| *ms > 0));
        }
        while self.advance() {}
    }

    /// Take one phase step if its wait is over. Returns true on progress.
    fn advance(&mut self) -> bool {
        match &mut self.phase {
            Phase::Idle => false,
            Phase::Resolving(resolution) => {
                resolution.pending.retain_mut(|handle| !handle.is_complete());
                if !resolution.pending.is_empty() || resolution.debounce_ms.is_some() {
                    return false;
                }
                if let Some(id) = resolution.special.take() {
                    if let Some(item) = self.grid.find(id) {
                        let handle = self.presentation.on_special_created(item);
                        resolution.pending.push(handle);
                    }
                    return true;
                }
                self.finish_resolution();
                true
            }
            Phase::Falling(pending) => {
                pending.retain_mut(|handle| !handle.is_complete());
                if !pending.is_empty() {
                    return false;
                }
                self.settle();
                true
            }
        }
    }

    fn finish_resolution(&mut self) {
        if self.moves_left < 0 {
            self.phase = Phase::Idle;
            self.state = BoardState::GameOver;
            tracing::debug!(level = ?self.level_id, "game over");
            self.goal_sink.on_game_over();
            return;
        }

        self.state = BoardState::Falling;
        let mut steps = compact(&mut self.grid);
        steps.extend(refill(&mut self.grid, &mut self.rng));
        recompute_primed(&mut self.grid);

        let mut pending = Vec::with_capacity(steps.len());
        for step in steps {
            if let Some(item) = self.grid.find(step.item) {
                pending.push(self.presentation.on_fall_step(item, step.from, step.to));
            }
        }
        tracing::debug!(steps = pending.len(), "falling");
        self.phase = Phase::Falling(pending);
    }

    fn settle(&mut self) {
        self.phase = Phase::Idle;
        self.state = BoardState::Ready;
        self.presentation.on_resolution_settled();

        if self.goals_met() {
            self.cleared = true;
            tracing::debug!(level = ?self.level_id, moves_left = self.moves_left, "level cleared");
            self.goal_sink.on_level_cleared();
        }
    }

    fn spend_move(&mut self) {
        self.moves_left -= 1;
        self.goals.recount(&self.grid);
        self.goal_sink.on_goals_updated(&self.goals);
        self.goal_sink.on_moves_updated(self.moves_left);
    }

    /// A level without obstacles is never cleared.
    fn goals_met(&self) -> bool {
        !self.goals.is_empty() && self.goals.is_complete()
    }

    fn debounce_window(&self) -> Option<u32> {
        Some(self.config.chain_debounce_ms).filter(|ms| *ms > 0)
    }

    fn dispatch(presentation: &mut P, events: Vec<CascadeEvent>, pending: &mut Vec<CompletionHandle>) {
        for event in events {
            match event {
                CascadeEvent::Activated(activation) => presentation.on_special_activated(activation),
                CascadeEvent::Destroyed(item) => pending.push(presentation.on_destroy(&item)),
                CascadeEvent::Damaged(item) => presentation.on_obstacle_damaged(&item),
            }
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            level: self.level_id,
            width: self.grid.width(),
            height: self.grid.height(),
            state: self.state.as_str(),
            moves_left: self.moves_left,
            goals: self.goals.entries(),
            level_cleared: self.cleared,
            cells: BoardSnapshot::cells_from(&self.grid),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn moves_left(&self) -> i32 {
        self.moves_left
    }

    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    pub fn level_id(&self) -> Option<u32> {
        self.level_id
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    pub fn goal_sink(&self) -> &G {
        &self.goal_sink
    }

    pub fn goal_sink_mut(&mut self) -> &mut G {
        &mut self.goal_sink
    }
}
