use mirrorboard_domain::CardId;

/// The text a card showed when editing began, used to restore the editor on cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub card_id: CardId,
    pub original_name: String,
    pub original_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing(EditSession),
}

/// Suspends reconciliation while the user is editing a card.
///
/// At most one session exists. Starting a second one while editing is a
/// no-op and leaves the first untouched.
#[derive(Debug, Default)]
pub struct EditGuard {
    state: EditState,
}

impl EditGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a session was started.
    pub fn begin_edit(
        &mut self,
        card_id: impl Into<CardId>,
        original_name: impl Into<String>,
        original_description: Option<String>,
    ) -> bool {
        if let EditState::Editing(session) = &self.state {
            tracing::debug!(
                "Ignoring edit request, card {} is already being edited",
                session.card_id
            );
            return false;
        }

        let session = EditSession {
            card_id: card_id.into(),
            original_name: original_name.into(),
            original_description,
        };
        tracing::debug!("Editing card {}", session.card_id);
        self.state = EditState::Editing(session);
        true
    }

    /// Ends the session, if any, and hands it back.
    pub fn end_edit(&mut self) -> Option<EditSession> {
        match std::mem::take(&mut self.state) {
            EditState::Editing(session) => {
                tracing::debug!("Finished editing card {}", session.card_id);
                Some(session)
            }
            EditState::Idle => None,
        }
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    pub fn is_editing(&self, card_id: &str) -> bool {
        self.session().is_some_and(|s| s.card_id == card_id)
    }

    pub fn session(&self) -> Option<&EditSession> {
        match &self.state {
            EditState::Editing(session) => Some(session),
            EditState::Idle => None,
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let guard = EditGuard::new();
        assert!(!guard.is_suspended());
        assert_eq!(guard.state(), &EditState::Idle);
    }

    #[test]
    fn test_begin_and_end() {
        let mut guard = EditGuard::new();
        assert!(guard.begin_edit("c1", "Old", Some("Desc".into())));
        assert!(guard.is_suspended());
        assert!(guard.is_editing("c1"));

        let session = guard.end_edit().unwrap();
        assert_eq!(session.original_name, "Old");
        assert_eq!(session.original_description.as_deref(), Some("Desc"));
        assert!(!guard.is_suspended());
    }

    #[test]
    fn test_second_session_is_rejected() {
        let mut guard = EditGuard::new();
        guard.begin_edit("c1", "Old", Some("Desc".into()));
        assert!(!guard.begin_edit("c2", "Other", None));

        let session = guard.session().unwrap();
        assert_eq!(session.card_id, "c1");
        assert_eq!(session.original_name, "Old");
    }

    #[test]
    fn test_end_when_idle() {
        let mut guard = EditGuard::new();
        assert!(guard.end_edit().is_none());
        assert!(guard.begin_edit("c1", "Again", None));
    }
}
