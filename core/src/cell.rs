use serde::{Deserialize, Serialize};

/// Content of a single grid slot.
///
/// Position is never stored here, a cell is identified by its `(row, col)` slot in the
/// [`Grid`](crate::Grid).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell<K> {
    Empty,
    Occupied(K),
}

impl<K: Copy> Cell<K> {
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub const fn is_occupied(self) -> bool {
        matches!(self, Self::Occupied(_))
    }

    pub fn kind(self) -> Option<K> {
        match self {
            Self::Empty => None,
            Self::Occupied(kind) => Some(kind),
        }
    }
}

impl<K> Default for Cell<K> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<K> From<Option<K>> for Cell<K> {
    fn from(kind: Option<K>) -> Self {
        match kind {
            Some(kind) => Self::Occupied(kind),
            None => Self::Empty,
        }
    }
}
