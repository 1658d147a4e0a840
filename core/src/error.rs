use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Cells are not adjacent")]
    NotAdjacent,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Cascade did not settle within {rounds} rounds")]
    CascadeOverflow { rounds: u32 },
    #[error("Matched cell {coords:?} was already empty before removal")]
    MatchedCellEmpty { coords: Coord2 },
}

impl GameError {
    /// Whether this error signals a broken engine invariant rather than a bad action.
    pub const fn is_internal(self) -> bool {
        matches!(
            self,
            Self::CascadeOverflow { .. } | Self::MatchedCellEmpty { .. }
        )
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
