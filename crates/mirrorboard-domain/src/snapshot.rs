//! A resolved board at one instant, paired with the normalized form used to
//! compare it against the next resolution.
//!
//! The normalized form is never displayed. It is computed once, when the
//! snapshot is captured, so repeated comparisons against the last rendered
//! snapshot only normalize the incoming board.

use crate::board::Board;
use crate::comparator::SnapshotComparator;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    board: Board,
    /// `None` when the board could not be normalized; such a snapshot never
    /// compares equal to anything.
    canonical: Option<String>,
}

impl Snapshot {
    pub fn capture(board: Board, comparator: &SnapshotComparator) -> Self {
        let canonical = match comparator.canonical_form(&board) {
            Ok(form) => Some(form),
            Err(e) => {
                tracing::warn!("Could not normalize board {}: {}", board.id, e);
                None
            }
        };
        Self { board, canonical }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn canonical(&self) -> Option<&str> {
        self.canonical.as_deref()
    }
}
