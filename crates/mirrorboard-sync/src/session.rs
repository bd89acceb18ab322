use crate::backend::BoardBackend;
use crate::coordinator::MutationCoordinator;
use crate::edit_guard::EditSession;
use crate::presenter::{MutationOutcome, Presenter};
use crate::reconciler::{ReconcileOutcome, ReconciliationLoop};
use crate::state::Shared;
use mirrorboard_core::{BoardError, BoardReference, BoardResult, SyncSettings};
use mirrorboard_domain::{Board, BoardResolver, RecordSet, SnapshotComparator};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One displayed board: inbound snapshots and user mutations against the
/// same working copy.
///
/// Cloning is cheap and every clone drives the same session, so mutations can
/// be issued from several tasks while the feed runs in another.
#[derive(Clone)]
pub struct BoardSession {
    reconciler: ReconciliationLoop,
    coordinator: MutationCoordinator,
}

impl BoardSession {
    pub fn new(
        reference: BoardReference,
        backend: Arc<dyn BoardBackend>,
        presenter: Arc<dyn Presenter>,
        settings: SyncSettings,
    ) -> Self {
        Self::with_comparator(
            reference,
            SnapshotComparator::default(),
            backend,
            presenter,
            settings,
        )
    }

    pub fn with_comparator(
        reference: BoardReference,
        comparator: SnapshotComparator,
        backend: Arc<dyn BoardBackend>,
        presenter: Arc<dyn Presenter>,
        settings: SyncSettings,
    ) -> Self {
        tracing::info!("Opening board session for {}", reference);
        let shared = Arc::new(Shared::new(
            BoardResolver::new(reference),
            comparator,
            presenter,
            settings,
        ));
        Self {
            reconciler: ReconciliationLoop::from_shared(shared.clone()),
            coordinator: MutationCoordinator::new(shared, backend),
        }
    }

    pub fn reconciler(&self) -> &ReconciliationLoop {
        &self.reconciler
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        &self.coordinator
    }

    pub fn on_snapshot(&self, records: RecordSet) -> ReconcileOutcome {
        self.reconciler.on_source_update(records)
    }

    pub fn refresh(&self) -> ReconcileOutcome {
        self.reconciler.refresh()
    }

    pub async fn run(&self, rx: mpsc::Receiver<RecordSet>) {
        self.reconciler.run(rx).await
    }

    pub fn board(&self) -> Option<Board> {
        self.reconciler.board()
    }

    pub async fn request_move(
        &self,
        card_id: &str,
        source_list_id: &str,
        target_list_id: &str,
    ) -> BoardResult<MutationOutcome> {
        self.coordinator
            .move_card(card_id, source_list_id, target_list_id)
            .await
    }

    pub async fn request_create(
        &self,
        list_id: &str,
        name: &str,
        description: &str,
    ) -> BoardResult<MutationOutcome> {
        self.coordinator.create_card(list_id, name, description).await
    }

    pub fn request_edit(&self, card_id: &str) -> BoardResult<bool> {
        self.reconciler.begin_edit(card_id)
    }

    /// Saves the card currently being edited.
    pub async fn request_save(&self, name: &str, description: &str) -> BoardResult<MutationOutcome> {
        let session = self
            .reconciler
            .edit_session()
            .ok_or_else(|| BoardError::Validation("no card is being edited".into()))?;
        self.coordinator
            .update_card(&session.card_id, name, description)
            .await
    }

    pub fn request_cancel(&self) -> Option<EditSession> {
        self.reconciler.cancel_edit()
    }

    pub async fn request_delete(&self, card_id: &str) -> BoardResult<MutationOutcome> {
        self.coordinator.delete_card(card_id).await
    }
}
