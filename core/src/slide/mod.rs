use alloc::vec::Vec;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;
pub use engine::*;

mod engine;

/// Face value of a slide-merge tile, always a power of two `>= 2`.
pub type TileValue = u32;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    pub size: Coord2,
    pub win_value: TileValue,
    /// Chance that an injected tile is a 4 instead of a 2.
    pub four_probability: f64,
    pub initial_tiles: u8,
    pub seed: u64,
}

impl SlideConfig {
    pub fn new(size: Coord2, seed: u64) -> Self {
        Self {
            size,
            seed,
            ..Default::default()
        }
        .validated()
    }

    /// Clamps every field into its playable range.
    pub fn validated(self) -> Self {
        let size = (self.size.0.max(2), self.size.1.max(2));
        let win_value = self.win_value.max(4).checked_next_power_of_two().unwrap_or(1 << 31);
        let four_probability = clamp_probability(self.four_probability);
        let initial_tiles = self.initial_tiles.min(size.0.saturating_mul(size.1));

        let config = Self {
            size,
            win_value,
            four_probability,
            initial_tiles,
            seed: self.seed,
        };
        if config != self {
            log::warn!("Slide config {:?} clamped to {:?}", self, config);
        }
        config
    }
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            size: (4, 4),
            win_value: 2048,
            four_probability: 0.1,
            initial_tiles: 2,
            seed: 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    pub const fn reverse(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Every row or column of a `size` grid, each ordered from the destination edge outward.
    fn lines(self, (rows, cols): Coord2) -> impl Iterator<Item = Vec<Coord2>> {
        let count = match self {
            Self::Left | Self::Right => rows,
            Self::Up | Self::Down => cols,
        };
        (0..count).map(move |line| match self {
            Self::Left => (0..cols).map(|col| (line, col)).collect(),
            Self::Right => (0..cols).rev().map(|col| (line, col)).collect(),
            Self::Up => (0..rows).map(|row| (row, line)).collect(),
            Self::Down => (0..rows).rev().map(|row| (row, line)).collect(),
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideStep {
    /// Tile travelled across empty cells.
    Slide { from: Coord2, to: Coord2 },
    /// Tile at `from` merged into `into`, which now holds `value`.
    Merge {
        from: Coord2,
        into: Coord2,
        value: TileValue,
    },
    /// Random tile injected after a move.
    Spawn { at: Coord2, value: TileValue },
}

/// Result of the pure slide transition.
#[derive(Clone, Debug, PartialEq)]
pub struct SlideOutcome {
    pub grid: Grid<TileValue>,
    pub moved: bool,
    pub score_delta: u32,
    pub steps: Vec<SlideStep>,
}

/// Slides every tile toward `direction`, merging equal pairs at most once each.
pub fn apply(grid: &Grid<TileValue>, direction: Direction) -> SlideOutcome {
    let mut grid = grid.clone();
    let mut merged = grid.new_mask();
    let mut steps = Vec::new();
    let mut score_delta: u32 = 0;

    for line in direction.lines(grid.size()) {
        for index in 1..line.len() {
            let start = line[index];
            let Cell::Occupied(value) = grid[start] else {
                continue;
            };

            let mut current = index;
            while current > 0 && grid[line[current - 1]].is_empty() {
                current -= 1;
            }
            let here = line[current];
            if current != index {
                grid[here] = grid[start];
                grid[start] = Cell::Empty;
                steps.push(SlideStep::Slide {
                    from: start,
                    to: here,
                });
            }

            if current == 0 {
                continue;
            }
            let next = line[current - 1];
            if grid[next] == Cell::Occupied(value)
                && !merged[here.to_nd_index()]
                && !merged[next.to_nd_index()]
            {
                let doubled = value.saturating_mul(2);
                grid[next] = Cell::Occupied(doubled);
                grid[here] = Cell::Empty;
                merged[next.to_nd_index()] = true;
                score_delta = score_delta.saturating_add(doubled);
                steps.push(SlideStep::Merge {
                    from: here,
                    into: next,
                    value: doubled,
                });
            }
        }
    }

    SlideOutcome {
        grid,
        moved: !steps.is_empty(),
        score_delta,
        steps,
    }
}

/// NaN counts as never.
fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

/// Places a 2 or a 4 on a uniformly chosen empty cell, `None` when the grid is full.
///
/// `four_probability` is clamped into `0.0..=1.0`.
pub fn inject_random_tile<R: Rng + ?Sized>(
    grid: &mut Grid<TileValue>,
    four_probability: f64,
    rng: &mut R,
) -> Option<(Coord2, TileValue)> {
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return None;
    }

    let at = empty[rng.random_range(0..empty.len())];
    let value = if rng.random_bool(clamp_probability(four_probability)) {
        4
    } else {
        2
    };
    grid[at] = Cell::Occupied(value);
    Some((at, value))
}

pub fn contains_value(grid: &Grid<TileValue>, value: TileValue) -> bool {
    grid.iter().any(|(_, cell)| cell == Cell::Occupied(value))
}

/// No empty cell and no adjacent equal pair, so no direction can move.
pub fn is_loss(grid: &Grid<TileValue>) -> bool {
    grid.is_full() && !grid.has_equal_neighbors()
}

pub fn value_sum(grid: &Grid<TileValue>) -> u64 {
    grid.iter()
        .filter_map(|(_, cell)| cell.kind())
        .map(u64::from)
        .sum()
}

pub fn max_value(grid: &Grid<TileValue>) -> Option<TileValue> {
    grid.iter().filter_map(|(_, cell)| cell.kind()).max()
}

impl Grid<TileValue> {
    /// Builds a grid from plain values, `0` meaning empty.
    pub fn from_values<R: AsRef<[TileValue]>>(rows: &[R]) -> Result<Self> {
        let rows: Vec<Vec<Cell<TileValue>>> = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .iter()
                    .map(|&value| if value == 0 { Cell::Empty } else { Cell::Occupied(value) })
                    .collect()
            })
            .collect();
        Self::from_rows(&rows)
    }

    pub fn to_values(&self) -> Vec<Vec<TileValue>> {
        self.rows()
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.kind().unwrap_or(0)).collect())
            .collect()
    }
}
