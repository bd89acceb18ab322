//! Optimistic card mutations.
//!
//! Every mutation is applied to the working board and rendered before the
//! backend command is issued. When the command settles the change is either
//! kept (the next snapshot carries the authoritative state) or undone.
//! Snapshots arriving in between are held back by the reconciliation loop.

use crate::backend::{BoardBackend, CommandReceipt};
use crate::presenter::{MutationKind, MutationOutcome};
use crate::state::{Render, SessionState, Shared};
use mirrorboard_core::{BoardError, BoardResult};
use mirrorboard_domain::commands::{Command, InsertCard, MoveCard, RemoveCard, UpdateCardText};
use mirrorboard_domain::{Board, CardId};
use std::sync::Arc;

fn validate_name(name: &str) -> BoardResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BoardError::Validation("card name cannot be empty".into()));
    }
    Ok(name.to_string())
}

fn normalize_description(description: &str) -> Option<String> {
    let description = description.trim();
    (!description.is_empty()).then(|| description.to_string())
}

#[derive(Clone)]
pub struct MutationCoordinator {
    shared: Arc<Shared>,
    backend: Arc<dyn BoardBackend>,
}

impl MutationCoordinator {
    pub(crate) fn new(shared: Arc<Shared>, backend: Arc<dyn BoardBackend>) -> Self {
        Self { shared, backend }
    }

    /// Moves a card to the end of another list. A rejected move puts it
    /// back where it was.
    pub async fn move_card(
        &self,
        card_id: &str,
        source_list_id: &str,
        target_list_id: &str,
    ) -> BoardResult<MutationOutcome> {
        if source_list_id == target_list_id {
            tracing::debug!("Card {} dropped on its own list, nothing to do", card_id);
            return Ok(MutationOutcome::Skipped);
        }

        let command = MoveCard {
            card_id: card_id.to_string(),
            from_list_id: source_list_id.to_string(),
            to_list_id: target_list_id.to_string(),
        };
        let rollback = self.apply(|state| {
            let mirror = state.mirror_mut()?;
            mirror.persisted_card(card_id)?;
            let rollback = command.checkpoint(mirror)?;
            command.execute(mirror)?;
            Ok(rollback)
        })?;

        let outcome = match self.settle(self.backend.move_card(card_id, target_list_id)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Move of card {} failed, moving it back: {}", card_id, e);
                self.patch(&rollback);
                MutationOutcome::RolledBack {
                    reason: e.to_string(),
                }
            }
        };
        Ok(self.finish(MutationKind::Move, outcome))
    }

    /// Shows a temporary card at the end of `list_id` until the backend
    /// confirms or rejects the new card.
    pub async fn create_card(
        &self,
        list_id: &str,
        name: &str,
        description: &str,
    ) -> BoardResult<MutationOutcome> {
        let name = validate_name(name)?;
        let description = normalize_description(description);

        let temp_id = self.apply(|state| {
            let mirror = state.mirror_mut()?;
            let card = mirror.mint_temporary_card(name.clone(), description.clone());
            let temp_id = card.id.clone();
            InsertCard {
                list_id: list_id.to_string(),
                card,
            }
            .execute(mirror)?;
            Ok(temp_id)
        })?;

        let receipt = self.backend.create_card(
            list_id,
            &name,
            description.as_deref().unwrap_or_default(),
        );
        let outcome = match self.settle(receipt).await {
            Ok(outcome) => {
                self.schedule_purge(temp_id);
                outcome
            }
            Err(e) => {
                tracing::warn!("Creating card '{}' failed, removing placeholder: {}", name, e);
                self.patch(&RemoveCard {
                    card_id: temp_id,
                    adjust_count: true,
                });
                MutationOutcome::RolledBack {
                    reason: e.to_string(),
                }
            }
        };
        Ok(self.finish(MutationKind::Create, outcome))
    }

    /// Saves new text for a card and ends the edit session.
    ///
    /// An invalid name is rejected before anything changes, leaving the edit
    /// session open.
    pub async fn update_card(
        &self,
        card_id: &str,
        name: &str,
        description: &str,
    ) -> BoardResult<MutationOutcome> {
        let name = validate_name(name)?;
        let description = normalize_description(description);
        let command = UpdateCardText {
            card_id: card_id.to_string(),
            name: name.clone(),
            description: description.clone(),
        };

        let previous = self.apply(|state| {
            let mirror = state.mirror_mut()?;
            let previous = mirror
                .persisted_card(card_id)
                .map(|(_, card)| (card.name.clone(), card.description.clone()))?;
            command.execute(mirror)?;
            state.guard.end_edit();
            Ok(previous)
        })?;

        let receipt = self.backend.update_card(
            card_id,
            &name,
            description.as_deref().unwrap_or_default(),
        );
        let outcome = match self.settle(receipt).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Update of card {} failed, restoring text: {}", card_id, e);
                self.restore_text(&command, previous);
                MutationOutcome::RolledBack {
                    reason: e.to_string(),
                }
            }
        };
        Ok(self.finish(MutationKind::Update, outcome))
    }

    /// Deletes a card after the presenter confirms.
    ///
    /// A failed delete is not rolled back; the working board stays without
    /// the card until the next refresh.
    pub async fn delete_card(&self, card_id: &str) -> BoardResult<MutationOutcome> {
        let card = self.shared.with_state(|state| {
            let (_, card) = state
                .mirror
                .as_ref()
                .ok_or_else(|| BoardError::NotFound(format!("card {}", card_id)))?
                .persisted_card(card_id)?;
            Ok::<_, BoardError>(card.clone())
        })?;

        if !self.shared.presenter.confirm_delete(&card) {
            tracing::debug!("Delete of card {} declined", card_id);
            return Ok(MutationOutcome::Skipped);
        }

        self.apply(|state| {
            if state.guard.is_editing(card_id) {
                state.guard.end_edit();
            }
            RemoveCard {
                card_id: card_id.to_string(),
                adjust_count: true,
            }
            .execute(state.mirror_mut()?)
        })?;

        let outcome = match self.settle(self.backend.delete_card(card_id)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Delete of card {} failed: {}", card_id, e);
                MutationOutcome::Unrecoverable {
                    reason: e.to_string(),
                }
            }
        };
        Ok(self.finish(MutationKind::Delete, outcome))
    }

    /// Applies a local change, counts a command as in flight and renders.
    fn apply<R>(&self, f: impl FnOnce(&mut SessionState) -> BoardResult<R>) -> BoardResult<R> {
        let (value, board) = self.shared.with_state(|state| {
            let value = f(state)?;
            state.in_flight += 1;
            let board = state.mirror_mut()?.clone();
            Ok::<_, BoardError>((value, board))
        })?;
        self.shared.emit(Some(Render::Board(board)));
        Ok(value)
    }

    /// Applies a compensating change and renders. Failures are logged; the
    /// working board may already have been replaced.
    fn patch(&self, command: &dyn Command) {
        let render = self.shared.with_state(|state| {
            let mirror = state.mirror.as_mut()?;
            match command.execute(mirror) {
                Ok(()) => {
                    tracing::debug!("Applied: {}", command.description());
                    Some(Render::Board(mirror.clone()))
                }
                Err(e) => {
                    tracing::warn!("Could not apply '{}': {}", command.description(), e);
                    None
                }
            }
        });
        self.shared.emit(render);
    }

    /// Puts the previous text back unless the card has been edited again since.
    fn restore_text(&self, applied: &UpdateCardText, previous: (String, Option<String>)) {
        let still_applied = self.shared.with_state(|state| {
            state
                .mirror
                .as_ref()
                .and_then(|board| board.find_card(&applied.card_id))
                .is_some_and(|(_, card)| {
                    card.name == applied.name && card.description == applied.description
                })
        });
        if !still_applied {
            tracing::debug!("Card {} changed since the update, not restoring", applied.card_id);
            return;
        }

        let (name, description) = previous;
        self.patch(&UpdateCardText {
            card_id: applied.card_id.clone(),
            name,
            description,
        });
    }

    async fn settle(&self, receipt: CommandReceipt) -> BoardResult<MutationOutcome> {
        match receipt {
            CommandReceipt::Deferred(future) => future.await.map(|()| MutationOutcome::Confirmed),
            CommandReceipt::Detached => {
                tokio::time::sleep(self.shared.settings.command_grace_delay()).await;
                Ok(MutationOutcome::Assumed)
            }
        }
    }

    fn finish(&self, kind: MutationKind, outcome: MutationOutcome) -> MutationOutcome {
        self.shared.with_state(|state| {
            state.in_flight = state.in_flight.saturating_sub(1);
        });
        tracing::info!("Card {} settled: {:?}", kind, outcome);
        self.shared.presenter.on_mutation_settled(kind, &outcome);
        self.shared.flush();
        outcome
    }

    /// Drops the temporary card after a delay, leaving list counts alone.
    /// An edit still open on the card ends with it.
    fn schedule_purge(&self, temp_id: CardId) {
        let shared = Arc::clone(&self.shared);
        let delay = shared.settings.temp_card_purge_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let render = shared.with_state(|state| {
                if state.guard.is_editing(&temp_id) {
                    tracing::debug!("Closing edit of purged card {}", temp_id);
                    state.guard.end_edit();
                }
                let mirror: &mut Board = state.mirror.as_mut()?;
                RemoveCard {
                    card_id: temp_id.clone(),
                    adjust_count: false,
                }
                .execute(mirror)
                .ok()?;
                tracing::debug!("Purged temporary card {}", temp_id);
                Some(Render::Board(mirror.clone()))
            });
            shared.emit(render);
            shared.flush();
        });
    }
}
