use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// What happened to an action handed to [`Engine::submit_action`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Engine was busy settling or the game is over, action dropped.
    Ignored,
    /// Action was legal but nothing changed, e.g. sliding into a wall.
    NoChange,
    /// Action changed engine state, the engine may now be settling.
    Accepted,
}

impl SubmitOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Ignored => false,
            Self::NoChange => false,
            Self::Accepted => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminal {
    Win,
    Loss,
}

/// Read-only view handed to the renderer each tick.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot<'a, K> {
    pub grid: &'a Grid<K>,
    pub score: u32,
    pub best_score: Option<u32>,
    pub terminal: Option<Terminal>,
    pub selected: Option<Coord2>,
    pub move_count: u32,
    pub is_settled: bool,
}

/// Phase state machine contract shared by both engines.
///
/// The collaborator submits an action only while [`Engine::is_settled`] holds, then calls
/// [`Engine::tick`] once per rendered target until the engine settles again.
pub trait Engine {
    type Kind;
    type Action;
    type Step;

    fn submit_action(&mut self, action: Self::Action) -> Result<SubmitOutcome>;

    /// Advances the resolution sequence by one step, `None` only once settled.
    fn tick(&mut self) -> Result<Option<Self::Step>>;

    fn is_settled(&self) -> bool;

    fn snapshot(&self) -> Snapshot<'_, Self::Kind>;

    fn reset(&mut self);

    /// Minimum time the current target should stay on screen before the next tick.
    fn settle_delay(&self) -> Duration {
        Duration::ZERO
    }

    /// Runs [`Engine::tick`] until settled, collecting every step.
    fn settle(&mut self) -> Result<alloc::vec::Vec<Self::Step>> {
        let mut steps = alloc::vec::Vec::new();
        while !self.is_settled() {
            steps.extend(self.tick()?);
        }
        Ok(steps)
    }
}
