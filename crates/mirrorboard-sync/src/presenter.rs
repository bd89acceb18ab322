use mirrorboard_domain::{Board, BoardNotFound, Card};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Move,
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn verb(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// How a requested mutation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backend acknowledged the command.
    Confirmed,
    /// The backend gives no acknowledgement; success was assumed after the grace delay.
    Assumed,
    /// The backend rejected the command and the optimistic change was undone.
    RolledBack { reason: String },
    /// The backend rejected the command and the local board cannot be repaired.
    Unrecoverable { reason: String },
    /// Nothing was requested (same-list move, declined delete).
    Skipped,
}

impl MutationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::RolledBack { .. } | Self::Unrecoverable { .. })
    }

    /// Text for the failure notification, if the outcome warrants one.
    pub fn notification(&self, kind: MutationKind) -> Option<String> {
        match self {
            Self::RolledBack { reason } => Some(format!("Failed to {} card: {}", kind, reason)),
            Self::Unrecoverable { reason } => Some(format!(
                "Failed to {} card: {}. The board may be out of date, refresh to reload it.",
                kind, reason
            )),
            _ => None,
        }
    }
}

/// The display side of a board session.
///
/// Callbacks are made without any session lock held, so implementations may
/// call back into the session.
pub trait Presenter: Send + Sync {
    /// The working board changed and should be redrawn.
    fn on_snapshot_changed(&self, board: &Board);

    /// The configured board could not be resolved; show a placeholder.
    fn on_board_missing(&self, missing: &BoardNotFound);

    /// A mutation settled. Skipped mutations are not reported.
    fn on_mutation_settled(&self, kind: MutationKind, outcome: &MutationOutcome);

    /// Asked before a delete is applied. Declining leaves the board untouched.
    fn confirm_delete(&self, _card: &Card) -> bool {
        true
    }
}
