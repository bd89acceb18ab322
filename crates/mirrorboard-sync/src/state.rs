use crate::edit_guard::EditGuard;
use crate::presenter::Presenter;
use crate::reconciler::ReconcileOutcome;
use mirrorboard_core::{BoardError, BoardResult, SyncSettings};
use mirrorboard_domain::{Board, BoardNotFound, BoardResolver, RecordSet, Snapshot, SnapshotComparator};
use parking_lot::Mutex;
use std::sync::Arc;

/// What the presenter was last told to show.
#[derive(Debug, Default)]
pub(crate) enum Rendered {
    #[default]
    Nothing,
    Missing,
    Board(Snapshot),
}

/// A redraw decided under the lock and delivered after it is released.
#[derive(Debug)]
pub(crate) enum Render {
    Board(Board),
    Missing(BoardNotFound),
}

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub guard: EditGuard,
    /// The working board, including optimistic changes.
    pub mirror: Option<Board>,
    pub rendered: Rendered,
    pub latest: Option<RecordSet>,
    /// A snapshot arrived while reconciliation was held back.
    pub deferred: bool,
    /// The held-back reconciliation must redraw even when nothing changed.
    pub force_next: bool,
    pub in_flight: usize,
}

impl SessionState {
    fn is_held(&self) -> bool {
        self.guard.is_suspended() || self.in_flight > 0
    }

    pub fn mirror_mut(&mut self) -> BoardResult<&mut Board> {
        self.mirror
            .as_mut()
            .ok_or_else(|| BoardError::NotFound("no board is displayed".into()))
    }
}

/// State shared by the reconciliation loop and the mutation coordinator.
pub(crate) struct Shared {
    state: Mutex<SessionState>,
    resolver: BoardResolver,
    comparator: SnapshotComparator,
    pub presenter: Arc<dyn Presenter>,
    pub settings: SyncSettings,
}

impl Shared {
    pub fn new(
        resolver: BoardResolver,
        comparator: SnapshotComparator,
        presenter: Arc<dyn Presenter>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            resolver,
            comparator,
            presenter,
            settings,
        }
    }

    pub fn resolver(&self) -> &BoardResolver {
        &self.resolver
    }

    /// Runs `f` under the session lock. Never call the presenter from `f`.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.state.lock())
    }

    pub fn emit(&self, render: Option<Render>) {
        match render {
            Some(Render::Board(board)) => self.presenter.on_snapshot_changed(&board),
            Some(Render::Missing(missing)) => self.presenter.on_board_missing(&missing),
            None => {}
        }
    }

    /// Handles an inbound record set.
    pub fn observe(&self, records: RecordSet) -> ReconcileOutcome {
        let (outcome, render) = self.with_state(|state| {
            if state.is_held() {
                tracing::debug!(
                    "Deferring reconciliation (editing: {}, in flight: {})",
                    state.guard.is_suspended(),
                    state.in_flight
                );
                state.latest = Some(records);
                state.deferred = true;
                return (ReconcileOutcome::Deferred, None);
            }
            let result = self.reconcile(state, &records, false);
            state.latest = Some(records);
            result
        });
        self.emit(render);
        outcome
    }

    /// Re-resolves the latest records and redraws unconditionally.
    pub fn refresh(&self) -> ReconcileOutcome {
        let (outcome, render) = self.with_state(|state| {
            if state.latest.is_none() {
                return (ReconcileOutcome::NoRecords, None);
            }
            if state.is_held() {
                state.deferred = true;
                state.force_next = true;
                return (ReconcileOutcome::Deferred, None);
            }
            let records = state.latest.take();
            let result = match &records {
                Some(records) => self.reconcile(state, records, true),
                None => (ReconcileOutcome::NoRecords, None),
            };
            state.latest = records;
            result
        });
        self.emit(render);
        outcome
    }

    /// Replays the most recent held-back records once nothing holds them.
    pub fn flush(&self) -> Option<ReconcileOutcome> {
        let (outcome, render) = self.with_state(|state| {
            if !state.deferred || state.is_held() {
                return (None, None);
            }
            state.deferred = false;
            let force = std::mem::take(&mut state.force_next);
            let records = state.latest.take();
            let (outcome, render) = match &records {
                Some(records) => self.reconcile(state, records, force),
                None => (ReconcileOutcome::NoRecords, None),
            };
            state.latest = records;
            tracing::debug!("Replayed deferred records: {:?}", outcome);
            (Some(outcome), render)
        });
        self.emit(render);
        outcome
    }

    fn reconcile(
        &self,
        state: &mut SessionState,
        records: &RecordSet,
        force: bool,
    ) -> (ReconcileOutcome, Option<Render>) {
        match self.resolver.resolve(records) {
            Ok(board) => {
                let next = Snapshot::capture(board, &self.comparator);
                let changed = force
                    || match &state.rendered {
                        Rendered::Board(previous) => {
                            self.comparator.has_snapshot_changed(Some(previous), Some(&next))
                        }
                        Rendered::Nothing | Rendered::Missing => true,
                    };
                if !changed {
                    tracing::debug!("Board {} unchanged, keeping working copy", next.board().id);
                    return (ReconcileOutcome::Unchanged, None);
                }

                let board = next.board().clone();
                tracing::debug!("Rendering board {} ({} cards)", board.id, board.card_total());
                state.mirror = Some(board.clone());
                state.rendered = Rendered::Board(next);
                (ReconcileOutcome::Rendered, Some(Render::Board(board)))
            }
            Err(missing) => {
                let changed = force || !matches!(state.rendered, Rendered::Missing);
                if !changed {
                    return (ReconcileOutcome::Unchanged, None);
                }
                tracing::warn!("{}", missing);
                state.mirror = None;
                state.rendered = Rendered::Missing;
                (ReconcileOutcome::BoardMissing, Some(Render::Missing(missing)))
            }
        }
    }
}
