use super::Command;
use crate::{Board, Card, CardId, ListId};
use mirrorboard_core::{BoardError, BoardResult};

fn card_not_found(card_id: &str) -> BoardError {
    BoardError::NotFound(format!("card {}", card_id))
}

fn list_not_found(list_id: &str) -> BoardError {
    BoardError::NotFound(format!("list {}", list_id))
}

/// Move a card to the end of another list, adjusting both counts
pub struct MoveCard {
    pub card_id: CardId,
    pub from_list_id: ListId,
    pub to_list_id: ListId,
}

impl MoveCard {
    /// Records where the card sits now so the move can be undone exactly.
    /// Must be taken on the same board state the move is executed against.
    pub fn checkpoint(&self, board: &Board) -> BoardResult<MoveRollback> {
        let source = board
            .list(&self.from_list_id)
            .ok_or_else(|| list_not_found(&self.from_list_id))?;
        let position = source
            .position_of(&self.card_id)
            .ok_or_else(|| card_not_found(&self.card_id))?;
        Ok(MoveRollback {
            card_id: self.card_id.clone(),
            source_list_id: self.from_list_id.clone(),
            target_list_id: self.to_list_id.clone(),
            position,
            source_decremented: source.card_count > 0,
        })
    }
}

/// Undoes a [`MoveCard`]: the card returns to its old position and only the
/// count changes the move actually made are reversed.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRollback {
    pub card_id: CardId,
    pub source_list_id: ListId,
    pub target_list_id: ListId,
    pub position: usize,
    /// False when the source count was already zero and could not drop.
    pub source_decremented: bool,
}

impl Command for MoveRollback {
    fn execute(&self, board: &mut Board) -> BoardResult<()> {
        if board.list(&self.source_list_id).is_none() {
            return Err(list_not_found(&self.source_list_id));
        }
        let target = board
            .list_mut(&self.target_list_id)
            .ok_or_else(|| list_not_found(&self.target_list_id))?;
        let card = target
            .take_card(&self.card_id, true)
            .ok_or_else(|| card_not_found(&self.card_id))?;

        if let Some(source) = board.list_mut(&self.source_list_id) {
            source.insert_card_at(self.position, card);
            if self.source_decremented {
                source.card_count += 1;
            }
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Return card {} from list {} to position {} of list {}",
            self.card_id, self.target_list_id, self.position, self.source_list_id
        )
    }
}

impl Command for MoveCard {
    fn execute(&self, board: &mut Board) -> BoardResult<()> {
        if self.from_list_id == self.to_list_id {
            return Ok(());
        }
        if board.list(&self.to_list_id).is_none() {
            return Err(list_not_found(&self.to_list_id));
        }
        let source = board
            .list_mut(&self.from_list_id)
            .ok_or_else(|| list_not_found(&self.from_list_id))?;
        let card = source
            .take_card(&self.card_id, true)
            .ok_or_else(|| card_not_found(&self.card_id))?;

        if let Some(target) = board.list_mut(&self.to_list_id) {
            target.push_card(card);
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Move card {} from list {} to list {}",
            self.card_id, self.from_list_id, self.to_list_id
        )
    }
}

/// Append a card to a list and bump its count
pub struct InsertCard {
    pub list_id: ListId,
    pub card: Card,
}

impl Command for InsertCard {
    fn execute(&self, board: &mut Board) -> BoardResult<()> {
        if board.contains_card(&self.card.id) {
            return Err(BoardError::Internal(format!(
                "card {} is already on the board",
                self.card.id
            )));
        }
        let list = board
            .list_mut(&self.list_id)
            .ok_or_else(|| list_not_found(&self.list_id))?;
        list.push_card(self.card.clone());
        Ok(())
    }

    fn description(&self) -> String {
        format!("Insert card '{}' into list {}", self.card.name, self.list_id)
    }
}

/// Remove a card from whichever list holds it
pub struct RemoveCard {
    pub card_id: CardId,
    /// Whether the holding list's count is decremented.
    pub adjust_count: bool,
}

impl Command for RemoveCard {
    fn execute(&self, board: &mut Board) -> BoardResult<()> {
        let list = board
            .lists
            .iter_mut()
            .find(|l| l.card(&self.card_id).is_some())
            .ok_or_else(|| card_not_found(&self.card_id))?;
        list.take_card(&self.card_id, self.adjust_count);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Remove card {}", self.card_id)
    }
}

/// Replace a card's displayed name and description
pub struct UpdateCardText {
    pub card_id: CardId,
    pub name: String,
    pub description: Option<String>,
}

impl Command for UpdateCardText {
    fn execute(&self, board: &mut Board) -> BoardResult<()> {
        let card = board
            .find_card_mut(&self.card_id)
            .ok_or_else(|| card_not_found(&self.card_id))?;
        card.update_text(self.name.clone(), self.description.clone());
        Ok(())
    }

    fn description(&self) -> String {
        format!("Update card {}", self.card_id)
    }
}
