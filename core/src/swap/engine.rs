use alloc::collections::VecDeque;
use core::time::Duration;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapAction {
    /// Clicks a cell, a second click on a neighbor attempts the swap.
    Select(Coord2),
    Swap(Coord2, Coord2),
    Deselect,
}

/// Valid transitions:
/// - Idle -> Selecting
/// - Idle | Selecting -> Swapping
/// - Swapping -> Matching
/// - Swapping -> SwappingBack -> Idle
/// - Matching -> Dropping
/// - Dropping -> Matching
/// - Dropping -> Idle
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapState {
    Idle,
    Selecting(Coord2),
    Swapping,
    SwappingBack,
    Matching,
    Dropping,
}

impl SwapState {
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Idle | Self::Selecting(_))
    }
}

impl Default for SwapState {
    fn default() -> Self {
        Self::Idle
    }
}

/// One observable change, every tick taken while unsettled yields exactly one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapStep {
    /// Speculative swap shown on the board, kept or pending a revert.
    Swapped { a: Coord2, b: Coord2 },
    /// Swap produced no match and was reverted.
    SwappedBack { a: Coord2, b: Coord2 },
    Removed(Removal),
    Dropped { from: Coord2, to: Coord2 },
    Refilled { at: Coord2, kind: GemKind },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PendingSwap {
    a: Coord2,
    b: Coord2,
    matched: bool,
}

/// Swap-match game session driving speculative swaps and cascades one step per tick.
#[derive(Clone, Debug)]
pub struct SwapEngine {
    config: SwapConfig,
    grid: Grid<GemKind>,
    rng: SmallRng,
    score: u32,
    move_count: u32,
    state: SwapState,
    pending_swap: Option<PendingSwap>,
    cascade_rounds: u32,
    pending: VecDeque<SwapStep>,
}

impl SwapEngine {
    pub fn new(config: SwapConfig) -> Self {
        let config = config.validated();
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let grid = initialize_grid(config.size, config.kinds, &mut rng);
        Self::with_parts(config, grid, rng)
    }

    /// Starts from an explicit grid, the config size follows the grid.
    ///
    /// Grids smaller than 3x3 are rejected with [`GameError::InvalidBoardShape`].
    pub fn from_grid(grid: Grid<GemKind>, config: SwapConfig) -> Result<Self> {
        let config = SwapConfig {
            size: grid.size(),
            ..config
        }
        .validated();
        if config.size != grid.size() {
            return Err(GameError::InvalidBoardShape);
        }
        let rng = SmallRng::seed_from_u64(config.seed);
        Ok(Self::with_parts(config, grid, rng))
    }

    fn with_parts(config: SwapConfig, grid: Grid<GemKind>, rng: SmallRng) -> Self {
        Self {
            config,
            grid,
            rng,
            score: 0,
            move_count: 0,
            state: Default::default(),
            pending_swap: None,
            cascade_rounds: 0,
            pending: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid<GemKind> {
        &self.grid
    }

    pub fn state(&self) -> SwapState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn selected(&self) -> Option<Coord2> {
        match self.state {
            SwapState::Selecting(coords) => Some(coords),
            _ => None,
        }
    }

    fn begin_swap(&mut self, a: Coord2, b: Coord2) -> Result<SubmitOutcome> {
        swap(&mut self.grid, a, b)?;
        let matched = !find_matches(&self.grid).is_empty();
        log::debug!("swap {:?} <-> {:?}, matched: {}", a, b, matched);
        self.pending_swap = Some(PendingSwap { a, b, matched });
        self.state = SwapState::Swapping;
        Ok(SubmitOutcome::Accepted)
    }

    /// Empties the current matches as the next cascade round.
    fn remove_matches(&mut self) -> Result<SwapStep> {
        let limit = cascade_limit(&self.grid);
        if self.cascade_rounds >= limit {
            return Err(GameError::CascadeOverflow {
                rounds: self.cascade_rounds,
            });
        }

        let matches = find_matches(&self.grid);
        let removal = remove_and_score(&mut self.grid, &matches)?;
        self.cascade_rounds += 1;
        self.score = self.score.saturating_add(removal.score_delta);
        log::trace!(
            "cascade round {}: {} removed",
            self.cascade_rounds,
            removal.removed.len()
        );
        Ok(SwapStep::Removed(removal))
    }

    fn queue_gravity(&mut self) {
        let gravity = apply_gravity_and_refill(&mut self.grid, self.config.kinds, &mut self.rng);
        self.pending.extend(
            gravity
                .drops
                .into_iter()
                .map(|(from, to)| SwapStep::Dropped { from, to }),
        );
        self.pending.extend(
            gravity
                .refills
                .into_iter()
                .map(|(at, kind)| SwapStep::Refilled { at, kind }),
        );
    }

    fn finish_round(&mut self) {
        if find_matches(&self.grid).is_empty() {
            log::debug!("cascade settled after {} rounds", self.cascade_rounds);
            self.pending_swap = None;
            self.state = SwapState::Idle;
        } else {
            self.state = SwapState::Matching;
        }
    }

    fn abort(&mut self, err: GameError) -> GameError {
        log::error!("resolution aborted in {:?}: {}", self.state, err);
        self.state = SwapState::Idle;
        self.pending_swap = None;
        self.pending.clear();
        err
    }
}

impl Engine for SwapEngine {
    type Kind = GemKind;
    type Action = SwapAction;
    type Step = SwapStep;

    fn submit_action(&mut self, action: SwapAction) -> Result<SubmitOutcome> {
        use SwapAction::*;

        if !self.state.accepts_input() {
            log::trace!("{:?} ignored in {:?}", action, self.state);
            return Ok(SubmitOutcome::Ignored);
        }

        match action {
            Deselect => Ok(match self.state {
                SwapState::Selecting(_) => {
                    self.state = SwapState::Idle;
                    SubmitOutcome::Accepted
                }
                _ => SubmitOutcome::NoChange,
            }),
            Select(coords) => {
                let coords = self.grid.validate_coords(coords)?;
                match self.state {
                    SwapState::Selecting(prev) if is_adjacent(prev, coords) => {
                        self.begin_swap(prev, coords)
                    }
                    SwapState::Selecting(prev) if prev == coords => Ok(SubmitOutcome::NoChange),
                    _ => {
                        self.state = SwapState::Selecting(coords);
                        Ok(SubmitOutcome::Accepted)
                    }
                }
            }
            Swap(a, b) => {
                let a = self.grid.validate_coords(a)?;
                let b = self.grid.validate_coords(b)?;
                if !is_adjacent(a, b) {
                    return Err(GameError::NotAdjacent);
                }
                self.begin_swap(a, b)
            }
        }
    }

    fn tick(&mut self) -> Result<Option<SwapStep>> {
        use SwapState::*;

        match self.state {
            Idle | Selecting(_) => Ok(None),
            Swapping => {
                let Some(PendingSwap { a, b, matched }) = self.pending_swap else {
                    log::error!("swapping without a pending swap");
                    self.state = Idle;
                    return Ok(None);
                };
                if matched {
                    self.move_count = self.move_count.saturating_add(1);
                    self.cascade_rounds = 0;
                    self.state = Matching;
                } else {
                    self.state = SwappingBack;
                }
                Ok(Some(SwapStep::Swapped { a, b }))
            }
            SwappingBack => {
                let Some(PendingSwap { a, b, .. }) = self.pending_swap.take() else {
                    log::error!("swapping back without a pending swap");
                    self.state = Idle;
                    return Ok(None);
                };
                self.grid.swap_cells(a, b);
                self.state = Idle;
                log::debug!("no match, swapped back {:?} <-> {:?}", a, b);
                Ok(Some(SwapStep::SwappedBack { a, b }))
            }
            Matching => match self.remove_matches() {
                Ok(step) => {
                    self.state = Dropping;
                    Ok(Some(step))
                }
                Err(err) => Err(self.abort(err)),
            },
            Dropping => {
                if self.pending.is_empty() {
                    self.queue_gravity();
                }
                let step = self.pending.pop_front();
                if self.pending.is_empty() {
                    self.finish_round();
                }
                Ok(step)
            }
        }
    }

    fn is_settled(&self) -> bool {
        self.state.accepts_input()
    }

    fn snapshot(&self) -> Snapshot<'_, GemKind> {
        Snapshot {
            grid: &self.grid,
            score: self.score,
            best_score: None,
            terminal: None,
            selected: self.selected(),
            move_count: self.move_count,
            is_settled: self.is_settled(),
        }
    }

    /// Fresh match-free grid on the same RNG stream.
    fn reset(&mut self) {
        self.grid = initialize_grid(self.config.size, self.config.kinds, &mut self.rng);
        self.score = 0;
        self.move_count = 0;
        self.state = SwapState::Idle;
        self.pending_swap = None;
        self.cascade_rounds = 0;
        self.pending.clear();
        log::debug!("swap game reset");
    }

    /// The reverted swap stays on screen for [`SWAP_BACK_DELAY`] before it is undone.
    fn settle_delay(&self) -> Duration {
        match self.state {
            SwapState::SwappingBack => SWAP_BACK_DELAY,
            _ => Duration::ZERO,
        }
    }
}
