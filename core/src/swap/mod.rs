use alloc::vec::Vec;
use core::time::Duration;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;
pub use engine::*;

mod engine;

/// Colour index of a gem, `0..kinds`.
pub type GemKind = u8;

pub const POINTS_PER_GEM: u32 = 10;

/// Shortest run of equal gems that counts as a match.
pub const MIN_RUN: usize = 3;

/// Pause before a swap that produced no match is reverted.
pub const SWAP_BACK_DELAY: Duration = Duration::from_millis(300);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    pub size: Coord2,
    pub kinds: GemKind,
    pub seed: u64,
}

impl SwapConfig {
    pub fn new(size: Coord2, kinds: GemKind, seed: u64) -> Self {
        Self { size, kinds, seed }.validated()
    }

    /// Clamps size and kind count so that a match-free grid can always be seeded.
    pub fn validated(self) -> Self {
        let config = Self {
            size: (self.size.0.max(3), self.size.1.max(3)),
            kinds: self.kinds.max(3),
            seed: self.seed,
        };
        if config != self {
            log::warn!("Swap config {:?} clamped to {:?}", self, config);
        }
        config
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            size: (7, 7),
            kinds: 6,
            seed: 0,
        }
    }
}

/// Cells belonging to a maximal run of three or more, freshly computed per check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matches {
    mask: Array2<bool>,
    count: CellCount,
}

impl Matches {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn count(&self) -> CellCount {
        self.count
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.mask
            .get(coords.to_nd_index())
            .copied()
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord2> + '_ {
        let (rows, cols) = self.mask.dim();
        iter_coords((rows as Coord, cols as Coord))
            .filter(|&coords| self.mask[coords.to_nd_index()])
    }
}

/// Flags every maximal horizontal or vertical run of at least [`MIN_RUN`] equal occupied cells.
pub fn find_matches<K: Copy + PartialEq>(grid: &Grid<K>) -> Matches {
    let (rows, cols) = grid.size();
    let mut mask = grid.new_mask();

    let lines = (0..rows)
        .map(|row| (0..cols).map(|col| (row, col)).collect::<Vec<_>>())
        .chain((0..cols).map(|col| (0..rows).map(|row| (row, col)).collect::<Vec<_>>()));

    for line in lines {
        let mut start = 0;
        while start < line.len() {
            let cell = grid[line[start]];
            let mut end = start + 1;
            while end < line.len() && grid[line[end]] == cell {
                end += 1;
            }
            if cell.is_occupied() && end - start >= MIN_RUN {
                for &coords in &line[start..end] {
                    mask[coords.to_nd_index()] = true;
                }
            }
            start = end;
        }
    }

    // bounded by total_cells
    let count = mask.iter().filter(|&&flagged| flagged).count() as CellCount;
    Matches { mask, count }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub removed: Vec<Coord2>,
    pub score_delta: u32,
}

/// Empties every matched cell and scores [`POINTS_PER_GEM`] for each.
///
/// Fails without touching the grid when a matched cell is already empty.
pub fn remove_and_score<K: Copy + PartialEq>(
    grid: &mut Grid<K>,
    matches: &Matches,
) -> Result<Removal> {
    let removed: Vec<Coord2> = matches.iter().collect();
    if let Some(&coords) = removed.iter().find(|&&coords| grid[coords].is_empty()) {
        log::error!("matched cell {:?} is empty before removal", coords);
        return Err(GameError::MatchedCellEmpty { coords });
    }

    for &coords in &removed {
        grid[coords] = Cell::Empty;
    }
    // bounded by total_cells
    let score_delta = (removed.len() as u32).saturating_mul(POINTS_PER_GEM);
    Ok(Removal {
        removed,
        score_delta,
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gravity {
    /// `(from, to)` for every gem that fell.
    pub drops: Vec<(Coord2, Coord2)>,
    pub refills: Vec<(Coord2, GemKind)>,
}

/// Uniform kind in `0..kinds`, always `0` when `kinds` is zero.
pub fn random_kind<R: Rng + ?Sized>(kinds: GemKind, rng: &mut R) -> GemKind {
    rng.random_range(0..kinds.max(1))
}

/// Compacts each column downward in order, then tops it up with random gems.
pub fn apply_gravity_and_refill<R: Rng + ?Sized>(
    grid: &mut Grid<GemKind>,
    kinds: GemKind,
    rng: &mut R,
) -> Gravity {
    let (rows, cols) = grid.size();
    let mut gravity = Gravity::default();

    for col in 0..cols {
        let mut empty_count: Coord = 0;
        for row in (0..rows).rev() {
            let from = (row, col);
            if grid[from].is_empty() {
                empty_count += 1;
            } else if empty_count > 0 {
                let to = (row + empty_count, col);
                grid[to] = grid[from];
                grid[from] = Cell::Empty;
                gravity.drops.push((from, to));
            }
        }

        for row in 0..empty_count {
            let kind = random_kind(kinds, rng);
            grid[(row, col)] = Cell::Occupied(kind);
            gravity.refills.push(((row, col), kind));
        }
    }

    gravity
}

/// Exchanges two edge-adjacent cells.
pub fn swap<K: Copy + PartialEq>(grid: &mut Grid<K>, a: Coord2, b: Coord2) -> Result<()> {
    let a = grid.validate_coords(a)?;
    let b = grid.validate_coords(b)?;
    if !is_adjacent(a, b) {
        return Err(GameError::NotAdjacent);
    }
    grid.swap_cells(a, b);
    Ok(())
}

/// Random starting grid with no match, matched cells are re-rolled in place until none remain.
///
/// `kinds` is raised to 3, fewer kinds cannot always avoid a run.
pub fn initialize_grid<R: Rng + ?Sized>(
    size: Coord2,
    kinds: GemKind,
    rng: &mut R,
) -> Grid<GemKind> {
    let kinds = kinds.max(3);
    let mut grid = Grid::from_fn(size, |_| Cell::Occupied(random_kind(kinds, rng)));

    let mut passes = 0u32;
    loop {
        let matches = find_matches(&grid);
        if matches.is_empty() {
            break;
        }
        for coords in matches.iter() {
            grid[coords] = Cell::Occupied(random_kind(kinds, rng));
        }
        passes += 1;
    }
    log::trace!("initial grid settled after {} re-roll passes", passes);

    grid
}

/// One remove -> gravity -> refill pass of a cascade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeRound {
    pub round: u32,
    pub removal: Removal,
    pub gravity: Gravity,
}

/// Removes `matches`, drops and refills, counting as cascade round `round`.
pub fn cascade_round<R: Rng + ?Sized>(
    grid: &mut Grid<GemKind>,
    matches: &Matches,
    kinds: GemKind,
    rng: &mut R,
    round: u32,
) -> Result<CascadeRound> {
    let removal = remove_and_score(grid, matches)?;
    let gravity = apply_gravity_and_refill(grid, kinds, rng);
    log::trace!(
        "cascade round {}: {} removed, {} dropped",
        round,
        removal.removed.len(),
        gravity.drops.len()
    );
    Ok(CascadeRound {
        round,
        removal,
        gravity,
    })
}

/// Round cap for one action's cascade.
pub fn cascade_limit<K: Copy + PartialEq>(grid: &Grid<K>) -> u32 {
    u32::from(grid.total_cells())
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub rounds: u32,
    pub removed: u32,
    pub score_delta: u32,
}

/// Runs cascade rounds until the grid holds no match.
pub fn resolve_cascade<R: Rng + ?Sized>(
    grid: &mut Grid<GemKind>,
    kinds: GemKind,
    rng: &mut R,
) -> Result<CascadeOutcome> {
    let limit = cascade_limit(grid);
    let mut outcome = CascadeOutcome::default();

    loop {
        let matches = find_matches(grid);
        if matches.is_empty() {
            return Ok(outcome);
        }
        if outcome.rounds >= limit {
            log::error!("cascade still matching after {} rounds", outcome.rounds);
            return Err(GameError::CascadeOverflow {
                rounds: outcome.rounds,
            });
        }

        outcome.rounds += 1;
        let round = cascade_round(grid, &matches, kinds, rng, outcome.rounds)?;
        // bounded by total_cells
        outcome.removed += round.removal.removed.len() as u32;
        outcome.score_delta = outcome.score_delta.saturating_add(round.removal.score_delta);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::vec;
    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};

    /// Generator that only ever yields zero bits, every refill becomes kind 0.
    pub(crate) struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    /// Builds a gem grid from kinds, `None` meaning empty.
    pub(crate) fn gems<const W: usize>(rows: &[[Option<GemKind>; W]]) -> Grid<GemKind> {
        let rows: Vec<Vec<Cell<GemKind>>> = rows
            .iter()
            .map(|row| row.iter().map(|&kind| Cell::from(kind)).collect())
            .collect();
        Grid::from_rows(&rows).unwrap()
    }

    /// 7x7 checkerboard-like grid without any run, built from a repeating pattern.
    pub(crate) fn quiet_grid() -> Grid<GemKind> {
        Grid::from_fn((7, 7), |(row, col)| Cell::Occupied((row + 2 * col) % 4))
    }

    #[test]
    fn degenerate_kind_counts_do_not_panic() {
        let mut rng = SmallRng::seed_from_u64(4);

        assert_eq!(random_kind(0, &mut rng), 0);
        let grid = initialize_grid((4, 4), 0, &mut rng);

        assert!(find_matches(&grid).is_empty());
        assert!(grid.iter().all(|(_, cell)| cell.kind().is_some_and(|kind| kind < 3)));
    }

    #[test]
    fn quiet_grid_has_no_match() {
        assert!(find_matches(&quiet_grid()).is_empty());
    }

    #[test]
    fn horizontal_run_scores_thirty_before_gravity() {
        let mut grid = quiet_grid();
        for col in 1..=3 {
            grid[(2, col)] = Cell::Occupied(5);
        }

        let matches = find_matches(&grid);
        assert_eq!(matches.count(), 3);

        let removal = remove_and_score(&mut grid, &matches).unwrap();

        assert_eq!(removal.score_delta, 30);
        for col in 1..=3 {
            assert_eq!(grid[(2, col)], Cell::Empty);
        }
        assert_eq!(grid.occupied_count(), 46);
    }

    #[test]
    fn long_run_counts_as_one_maximal_match() {
        let grid = gems(&[
            [Some(1), Some(1), Some(1), Some(1), Some(2)],
            [Some(2), Some(3), Some(2), Some(3), Some(1)],
            [Some(3), Some(2), Some(3), Some(2), Some(3)],
        ]);

        let matches = find_matches(&grid);

        assert_eq!(matches.count(), 4);
        assert!(!matches.contains((0, 4)));
    }

    #[test]
    fn crossing_runs_flag_intersection_once() {
        let grid = gems(&[
            [Some(2), Some(1), Some(3)],
            [Some(1), Some(1), Some(1)],
            [Some(3), Some(1), Some(2)],
        ]);

        let matches = find_matches(&grid);

        assert_eq!(matches.count(), 5);
        assert!(matches.contains((1, 1)));
    }

    #[test]
    fn empty_cells_never_match() {
        let grid = gems(&[
            [None, None, None],
            [Some(1), Some(2), Some(1)],
            [Some(2), Some(1), Some(2)],
        ]);

        assert!(find_matches(&grid).is_empty());
    }

    #[test]
    fn removing_an_empty_matched_cell_is_an_error() {
        let grid = gems(&[
            [Some(1), Some(1), Some(1)],
            [Some(2), Some(3), Some(2)],
            [Some(3), Some(2), Some(3)],
        ]);
        let matches = find_matches(&grid);
        let mut stale = grid.clone();
        stale[(0, 1)] = Cell::Empty;

        let err = remove_and_score(&mut stale, &matches).unwrap_err();

        assert_eq!(err, GameError::MatchedCellEmpty { coords: (0, 1) });
        assert!(err.is_internal());
        assert_eq!(stale[(0, 0)], Cell::Occupied(1));
    }

    #[test]
    fn gravity_preserves_column_order() {
        let mut grid = gems(&[
            [Some(4), Some(1), Some(2)],
            [Some(5), None, Some(3)],
            [None, Some(2), Some(4)],
            [None, None, Some(5)],
        ]);
        let mut rng = SmallRng::seed_from_u64(1);

        let gravity = apply_gravity_and_refill(&mut grid, 6, &mut rng);

        assert_eq!(grid[(2, 0)], Cell::Occupied(4));
        assert_eq!(grid[(3, 0)], Cell::Occupied(5));
        assert_eq!(grid[(2, 1)], Cell::Occupied(1));
        assert_eq!(grid[(3, 1)], Cell::Occupied(2));
        assert_eq!(grid.rows()[3][2], Cell::Occupied(5));
        assert!(grid.is_full());
        assert_eq!(gravity.refills.len(), 4);
        assert_eq!(
            gravity.drops,
            vec![
                ((1, 0), (3, 0)),
                ((0, 0), (2, 0)),
                ((2, 1), (3, 1)),
                ((0, 1), (2, 1))
            ]
        );
    }

    #[test]
    fn swap_requires_adjacency() {
        let mut grid = quiet_grid();
        let before = grid.clone();

        assert_eq!(swap(&mut grid, (0, 0), (1, 1)), Err(GameError::NotAdjacent));
        assert_eq!(swap(&mut grid, (0, 0), (0, 2)), Err(GameError::NotAdjacent));
        assert_eq!(swap(&mut grid, (0, 6), (0, 7)), Err(GameError::InvalidCoords));
        assert_eq!(grid, before);

        swap(&mut grid, (0, 0), (0, 1)).unwrap();
        assert_eq!(grid[(0, 0)], before[(0, 1)]);
        assert_eq!(grid[(0, 1)], before[(0, 0)]);
    }

    #[test]
    fn initial_grid_has_no_match() {
        for seed in 0..32 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let grid = initialize_grid((7, 7), 6, &mut rng);

            assert!(grid.is_full());
            assert!(find_matches(&grid).is_empty(), "seed {} left a match", seed);
        }
    }

    #[test]
    fn cascade_settles_without_matches() {
        let mut grid = quiet_grid();
        for row in 3..6 {
            grid[(row, 4)] = Cell::Occupied(5);
        }
        let mut rng = SmallRng::seed_from_u64(11);

        let outcome = resolve_cascade(&mut grid, 6, &mut rng).unwrap();

        assert!(outcome.rounds >= 1);
        assert!(outcome.rounds <= cascade_limit(&grid));
        assert_eq!(outcome.score_delta, outcome.removed * POINTS_PER_GEM);
        assert!(find_matches(&grid).is_empty());
        assert!(grid.is_full());
    }

    #[test]
    fn endless_cascade_hits_round_limit() {
        let mut grid = gems(&[
            [Some(0), Some(0), Some(0)],
            [Some(1), Some(2), Some(1)],
            [Some(2), Some(1), Some(2)],
        ]);

        let err = resolve_cascade(&mut grid, 6, &mut ZeroRng).unwrap_err();

        assert_eq!(err, GameError::CascadeOverflow { rounds: 9 });
    }
}
