use alloc::collections::VecDeque;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideState {
    Idle,
    Settling,
    Terminal(Terminal),
}

impl SlideState {
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Settling)
    }

    /// Whether a new direction may be submitted, a win does not block play.
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Idle | Self::Terminal(Terminal::Win))
    }
}

impl Default for SlideState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Slide-merge game session: grid, scoring, and the Idle -> Settling -> Idle phase machine.
#[derive(Clone, Debug)]
pub struct SlideEngine {
    config: SlideConfig,
    grid: Grid<TileValue>,
    rng: SmallRng,
    score: u32,
    best_score: u32,
    move_count: u32,
    win_signaled: bool,
    state: SlideState,
    pending: VecDeque<SlideStep>,
}

impl SlideEngine {
    pub fn new(config: SlideConfig) -> Self {
        let config = config.validated();
        let mut engine = Self {
            config,
            grid: Grid::new(config.size),
            rng: SmallRng::seed_from_u64(config.seed),
            score: 0,
            best_score: 0,
            move_count: 0,
            win_signaled: false,
            state: Default::default(),
            pending: VecDeque::new(),
        };
        engine.reset();
        engine
    }

    /// Starts from an explicit grid instead of a seeded one, the config size follows the grid.
    ///
    /// Grids narrower than 2 on either axis are rejected with [`GameError::InvalidBoardShape`].
    pub fn from_grid(grid: Grid<TileValue>, config: SlideConfig) -> Result<Self> {
        let config = SlideConfig {
            size: grid.size(),
            ..config
        }
        .validated();
        if config.size != grid.size() {
            return Err(GameError::InvalidBoardShape);
        }
        let mut engine = Self {
            config,
            grid,
            rng: SmallRng::seed_from_u64(config.seed),
            score: 0,
            best_score: 0,
            move_count: 0,
            win_signaled: false,
            state: Default::default(),
            pending: VecDeque::new(),
        };
        engine.state = engine.evaluate_terminal();
        Ok(engine)
    }

    pub fn config(&self) -> &SlideConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid<TileValue> {
        &self.grid
    }

    pub fn state(&self) -> SlideState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SlideState::Terminal(Terminal::Loss))
    }

    /// Leaves the win screen, falling through to a loss when the winning grid is also stuck.
    pub fn continue_playing(&mut self) {
        if self.state == SlideState::Terminal(Terminal::Win) {
            self.state = if is_loss(&self.grid) {
                SlideState::Terminal(Terminal::Loss)
            } else {
                SlideState::Idle
            };
            log::debug!("continue after win -> {:?}", self.state);
        }
    }

    fn finish_move(&mut self) -> Option<SlideStep> {
        let spawned =
            inject_random_tile(&mut self.grid, self.config.four_probability, &mut self.rng);
        if spawned.is_none() {
            log::debug!("no empty cell left for injection");
        }
        self.state = self.evaluate_terminal();
        log::debug!("move settled -> {:?}", self.state);
        spawned.map(|(at, value)| SlideStep::Spawn { at, value })
    }

    fn evaluate_terminal(&mut self) -> SlideState {
        if !self.win_signaled && contains_value(&self.grid, self.config.win_value) {
            self.win_signaled = true;
            SlideState::Terminal(Terminal::Win)
        } else if is_loss(&self.grid) {
            SlideState::Terminal(Terminal::Loss)
        } else {
            SlideState::Idle
        }
    }
}

impl Engine for SlideEngine {
    type Kind = TileValue;
    type Action = Direction;
    type Step = SlideStep;

    fn submit_action(&mut self, direction: Direction) -> Result<SubmitOutcome> {
        if !self.state.accepts_input() {
            log::trace!("slide {:?} ignored in {:?}", direction, self.state);
            return Ok(SubmitOutcome::Ignored);
        }

        let outcome = apply(&self.grid, direction);
        if !outcome.moved {
            return Ok(SubmitOutcome::NoChange);
        }

        log::debug!(
            "slide {:?}: {} steps, +{} points",
            direction,
            outcome.steps.len(),
            outcome.score_delta
        );
        self.grid = outcome.grid;
        self.score = self.score.saturating_add(outcome.score_delta);
        self.best_score = self.best_score.max(self.score);
        self.move_count = self.move_count.saturating_add(1);
        self.pending = outcome.steps.into();
        self.state = SlideState::Settling;
        Ok(SubmitOutcome::Accepted)
    }

    fn tick(&mut self) -> Result<Option<SlideStep>> {
        if self.state != SlideState::Settling {
            return Ok(None);
        }

        if let Some(step) = self.pending.pop_front() {
            log::trace!("step {:?}", step);
            return Ok(Some(step));
        }

        Ok(self.finish_move())
    }

    fn is_settled(&self) -> bool {
        self.state.is_settled()
    }

    fn snapshot(&self) -> Snapshot<'_, TileValue> {
        Snapshot {
            grid: &self.grid,
            score: self.score,
            best_score: Some(self.best_score),
            terminal: match self.state {
                SlideState::Terminal(terminal) => Some(terminal),
                SlideState::Idle | SlideState::Settling => None,
            },
            selected: None,
            move_count: self.move_count,
            is_settled: self.is_settled(),
        }
    }

    /// New game on the same RNG stream, the best score survives.
    fn reset(&mut self) {
        self.grid = Grid::new(self.config.size);
        for _ in 0..self.config.initial_tiles {
            inject_random_tile(&mut self.grid, self.config.four_probability, &mut self.rng);
        }
        self.score = 0;
        self.move_count = 0;
        self.win_signaled = false;
        self.pending.clear();
        self.state = SlideState::Idle;
        log::debug!("slide game reset, {} tiles seeded", self.grid.occupied_count());
    }
}
