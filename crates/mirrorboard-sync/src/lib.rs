//! Keeps an optimistic, locally mutated board consistent with inbound
//! snapshots from the data source and with backend commands that settle
//! asynchronously.

pub mod backend;
pub mod coordinator;
pub mod edit_guard;
pub mod presenter;
pub mod reconciler;
pub mod session;
mod state;

pub use backend::{BoardBackend, CommandFuture, CommandReceipt};
pub use coordinator::MutationCoordinator;
pub use edit_guard::{EditGuard, EditSession, EditState};
pub use presenter::{MutationKind, MutationOutcome, Presenter};
pub use reconciler::{ReconcileOutcome, ReconciliationLoop};
pub use session::BoardSession;
