use crate::edit_guard::EditSession;
use crate::presenter::Presenter;
use crate::state::Shared;
use mirrorboard_core::{BoardError, BoardReference, BoardResult, SyncSettings};
use mirrorboard_domain::{Board, BoardResolver, RecordSet, SnapshotComparator};
use std::sync::Arc;
use tokio::sync::mpsc;

/// What happened to one inbound record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The board was redrawn from the records.
    Rendered,
    /// The board could not be resolved and the placeholder is shown.
    BoardMissing,
    /// Nothing meaningful changed; the working board was left alone.
    Unchanged,
    /// Held back by an edit session or an in-flight command.
    Deferred,
    /// No records have been observed yet.
    NoRecords,
}

/// Decides when inbound snapshots replace the working board.
///
/// Snapshots observed while a card is being edited or while any command is
/// in flight are held back. Only the latest is kept, and it is replayed once
/// the edit ends and every command has settled.
#[derive(Clone)]
pub struct ReconciliationLoop {
    shared: Arc<Shared>,
}

impl ReconciliationLoop {
    pub fn new(
        reference: BoardReference,
        presenter: Arc<dyn Presenter>,
        settings: SyncSettings,
    ) -> Self {
        Self::with_comparator(reference, SnapshotComparator::default(), presenter, settings)
    }

    pub fn with_comparator(
        reference: BoardReference,
        comparator: SnapshotComparator,
        presenter: Arc<dyn Presenter>,
        settings: SyncSettings,
    ) -> Self {
        let shared = Shared::new(BoardResolver::new(reference), comparator, presenter, settings);
        Self::from_shared(Arc::new(shared))
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn reference(&self) -> &BoardReference {
        self.shared.resolver().reference()
    }

    pub fn settings(&self) -> SyncSettings {
        self.shared.settings
    }

    pub fn on_source_update(&self, records: RecordSet) -> ReconcileOutcome {
        self.shared.observe(records)
    }

    /// Re-resolves the latest records and redraws even if nothing changed.
    pub fn refresh(&self) -> ReconcileOutcome {
        self.shared.refresh()
    }

    /// Feeds every record set from `rx` through the loop until the sender closes.
    pub async fn run(&self, mut rx: mpsc::Receiver<RecordSet>) {
        while let Some(records) = rx.recv().await {
            let outcome = self.on_source_update(records);
            tracing::debug!("Reconciled source update: {:?}", outcome);
        }
        tracing::info!("Source feed closed, stopping reconciliation for {}", self.reference());
    }

    /// Starts editing a card on the working board.
    ///
    /// Returns `false` when another edit is already active. Cards still
    /// waiting for the backend cannot be edited.
    pub fn begin_edit(&self, card_id: &str) -> BoardResult<bool> {
        self.shared.with_state(|state| {
            let (_, card) = state
                .mirror
                .as_ref()
                .ok_or_else(|| BoardError::NotFound(format!("card {}", card_id)))?
                .persisted_card(card_id)?;
            let (name, description) = (card.name.clone(), card.description.clone());
            Ok(state.guard.begin_edit(card_id, name, description))
        })
    }

    /// Abandons the edit. The returned session carries the text to restore
    /// in the editor.
    pub fn cancel_edit(&self) -> Option<EditSession> {
        let session = self.shared.with_state(|state| state.guard.end_edit());
        self.shared.flush();
        session
    }

    pub fn edit_session(&self) -> Option<EditSession> {
        self.shared.with_state(|state| state.guard.session().cloned())
    }

    pub fn is_suspended(&self) -> bool {
        self.shared.with_state(|state| state.guard.is_suspended())
    }

    /// A copy of the working board.
    pub fn board(&self) -> Option<Board> {
        self.shared.with_state(|state| state.mirror.clone())
    }

    pub fn has_deferred(&self) -> bool {
        self.shared.with_state(|state| state.deferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::{MutationKind, MutationOutcome};
    use mirrorboard_domain::{BoardNotFound, Card, List, RecordAttributes, SourceRecord};
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        boards: Mutex<Vec<Board>>,
        missing: Mutex<Vec<BoardReference>>,
    }

    impl Presenter for Recorder {
        fn on_snapshot_changed(&self, board: &Board) {
            self.boards.lock().push(board.clone());
        }

        fn on_board_missing(&self, missing: &BoardNotFound) {
            self.missing.lock().push(missing.reference.clone());
        }

        fn on_mutation_settled(&self, _kind: MutationKind, _outcome: &MutationOutcome) {}
    }

    fn board(card_name: &str) -> Board {
        Board::new("b1", "Roadmap")
            .with_list(List::new("l1", "Todo").with_cards(vec![Card::new("c1", card_name)]))
            .with_list(List::new("l2", "Done"))
    }

    fn records(board: &Board, last_updated: &str) -> RecordSet {
        let mut board = board.clone();
        board
            .extra
            .insert("last_updated".into(), json!(last_updated));
        let attributes = RecordAttributes {
            board_data: Some(board),
            ..Default::default()
        };
        RecordSet::new(vec![SourceRecord::new("sensor.trello_board_b1")
            .with_state("ok")
            .with_attributes(attributes)])
    }

    fn setup() -> (ReconciliationLoop, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let reconciler = ReconciliationLoop::new(
            BoardReference::Entity("sensor.trello_board_b1".into()),
            recorder.clone(),
            SyncSettings::default(),
        );
        (reconciler, recorder)
    }

    #[test]
    fn test_settings_are_kept() {
        let settings = SyncSettings {
            temp_card_purge_ms: 250,
            command_grace_ms: 40,
        };
        let reconciler = ReconciliationLoop::new(
            BoardReference::LegacyBoardId("b1".into()),
            Arc::new(Recorder::default()),
            settings,
        );
        assert_eq!(reconciler.settings(), settings);
    }

    #[test]
    fn test_first_observation_renders() {
        let (reconciler, recorder) = setup();
        let outcome = reconciler.on_source_update(records(&board("Write docs"), "t1"));

        assert_eq!(outcome, ReconcileOutcome::Rendered);
        assert_eq!(recorder.boards.lock().len(), 1);
        assert_eq!(reconciler.board().unwrap().card_total(), 1);
    }

    #[test]
    fn test_first_observation_without_board_shows_placeholder() {
        let (reconciler, recorder) = setup();
        let outcome = reconciler.on_source_update(RecordSet::default());

        assert_eq!(outcome, ReconcileOutcome::BoardMissing);
        assert_eq!(recorder.missing.lock().len(), 1);
        assert!(reconciler.board().is_none());

        // Still missing: no second placeholder
        assert_eq!(
            reconciler.on_source_update(RecordSet::default()),
            ReconcileOutcome::Unchanged
        );
        assert_eq!(recorder.missing.lock().len(), 1);
    }

    #[test]
    fn test_volatile_only_change_keeps_working_copy() {
        let (reconciler, recorder) = setup();
        reconciler.on_source_update(records(&board("Write docs"), "t1"));

        let outcome = reconciler.on_source_update(records(&board("Write docs"), "t2"));
        assert_eq!(outcome, ReconcileOutcome::Unchanged);
        assert_eq!(recorder.boards.lock().len(), 1);
    }

    #[test]
    fn test_edit_defers_and_cancel_replays_latest() {
        let (reconciler, recorder) = setup();
        reconciler.on_source_update(records(&board("Write docs"), "t1"));

        assert!(reconciler.begin_edit("c1").unwrap());
        assert_eq!(
            reconciler.on_source_update(records(&board("Intermediate"), "t2")),
            ReconcileOutcome::Deferred
        );
        reconciler.on_source_update(records(&board("Write better docs"), "t3"));
        assert!(reconciler.has_deferred());
        assert_eq!(recorder.boards.lock().len(), 1);

        let session = reconciler.cancel_edit().unwrap();
        assert_eq!(session.original_name, "Write docs");

        let boards = recorder.boards.lock();
        assert_eq!(boards.len(), 2);
        assert_eq!(boards[1].find_card("c1").unwrap().1.name, "Write better docs");
    }

    #[test]
    fn test_begin_edit_unknown_card() {
        let (reconciler, _) = setup();
        reconciler.on_source_update(records(&board("Write docs"), "t1"));

        let err = reconciler.begin_edit("nope").unwrap_err();
        assert!(matches!(err, BoardError::NotFound(_)));
        assert!(!reconciler.is_suspended());
    }

    #[test]
    fn test_begin_edit_rejects_unsaved_card() {
        let (reconciler, _) = setup();
        let draft = Card::temporary("Draft".into(), None);
        let draft_id = draft.id.clone();
        let mut with_draft = board("Write docs");
        with_draft.list_mut("l2").unwrap().push_card(draft);
        reconciler.on_source_update(records(&with_draft, "t1"));

        let err = reconciler.begin_edit(&draft_id).unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
        assert!(!reconciler.is_suspended());
    }

    #[test]
    fn test_refresh_redraws_unchanged_board() {
        let (reconciler, recorder) = setup();
        assert_eq!(reconciler.refresh(), ReconcileOutcome::NoRecords);

        reconciler.on_source_update(records(&board("Write docs"), "t1"));
        assert_eq!(reconciler.refresh(), ReconcileOutcome::Rendered);
        assert_eq!(recorder.boards.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_run_consumes_feed() {
        let (reconciler, recorder) = setup();
        let (tx, rx) = mpsc::channel(4);

        tx.send(records(&board("Write docs"), "t1")).await.unwrap();
        tx.send(records(&board("Ship it"), "t2")).await.unwrap();
        drop(tx);

        reconciler.run(rx).await;
        assert_eq!(recorder.boards.lock().len(), 2);
    }
}
