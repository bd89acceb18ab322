use crate::Board;
use mirrorboard_core::BoardResult;

pub mod card_commands;

pub use card_commands::*;

/// A named patch applied to the mirrored board.
///
/// Commands check their preconditions before touching the board, so a
/// failed command leaves the board exactly as it was.
pub trait Command: Send + Sync {
    /// Apply this command to the mirrored board.
    fn execute(&self, board: &mut Board) -> BoardResult<()>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}
