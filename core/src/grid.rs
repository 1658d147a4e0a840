use alloc::vec::Vec;
use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Row-major iterator over every coordinate of a `size` shaped grid.
pub fn iter_coords((rows, cols): Coord2) -> impl Iterator<Item = Coord2> {
    (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
}

/// Fixed-size 2D container of cells, shared by both engines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<K> {
    cells: Array2<Cell<K>>,
}

impl<K: Copy + PartialEq> Grid<K> {
    /// Fully empty grid.
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::from_elem(size.to_nd_index(), Cell::Empty),
        }
    }

    pub fn from_fn(size: Coord2, mut f: impl FnMut(Coord2) -> Cell<K>) -> Self {
        let cells = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            f((row as Coord, col as Coord))
        });
        Self { cells }
    }

    /// Builds a grid from explicit rows, all rows must have the same length.
    pub fn from_rows<R: AsRef<[Cell<K>]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if height == 0
            || width == 0
            || height > usize::from(Coord::MAX)
            || width > usize::from(Coord::MAX)
            || rows.iter().any(|row| row.as_ref().len() != width)
        {
            return Err(GameError::InvalidBoardShape);
        }

        let flat: Vec<Cell<K>> = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect();
        let cells = Array2::from_shape_vec([height, width], flat)
            .map_err(|_| GameError::InvalidBoardShape)?;
        Ok(Self { cells })
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        // construction never exceeds Coord::MAX on either axis
        (rows as Coord, cols as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let size = self.size();
        coords.0 < size.0 && coords.1 < size.1
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<Cell<K>> {
        self.contains(coords).then(|| self[coords])
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord2> + use<K> {
        iter_coords(self.size())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Cell<K>)> + '_ {
        self.coords().map(|coords| (coords, self[coords]))
    }

    pub fn empty_cells(&self) -> Vec<Coord2> {
        self.iter()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(coords, _)| coords)
            .collect()
    }

    pub fn occupied_count(&self) -> CellCount {
        // bounded by total_cells
        self.cells.iter().filter(|cell| cell.is_occupied()).count() as CellCount
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_occupied())
    }

    pub fn swap_cells(&mut self, a: Coord2, b: Coord2) {
        self.cells.swap(a.to_nd_index(), b.to_nd_index());
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    /// Whether any two edge-adjacent occupied cells hold the same kind.
    pub fn has_equal_neighbors(&self) -> bool {
        self.iter().any(|(coords, cell)| {
            cell.is_occupied() && self.iter_neighbors(coords).any(|pos| self[pos] == cell)
        })
    }

    /// Fresh all-false mask with the same shape, used for per-transition flags.
    pub fn new_mask(&self) -> Array2<bool> {
        Array2::from_elem(self.cells.dim(), false)
    }

    pub fn rows(&self) -> Vec<Vec<Cell<K>>> {
        self.cells.rows().into_iter().map(|row| row.to_vec()).collect()
    }
}

impl<K> Index<Coord2> for Grid<K> {
    type Output = Cell<K>;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl<K> IndexMut<Coord2> for Grid<K> {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}
