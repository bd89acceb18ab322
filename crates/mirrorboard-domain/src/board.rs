use crate::card::Card;
use crate::list::{List, ListId};
use mirrorboard_core::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type BoardId = String;

/// A resolved board. `lists` is in column display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub id: BoardId,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "crate::ordered")]
    pub lists: Vec<List>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Board {
    pub fn new(id: impl Into<BoardId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lists: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_list(mut self, list: List) -> Self {
        crate::ordered::upsert(&mut self.lists, list);
        self
    }

    pub fn list(&self, list_id: &str) -> Option<&List> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    pub fn list_mut(&mut self, list_id: &str) -> Option<&mut List> {
        self.lists.iter_mut().find(|l| l.id == list_id)
    }

    pub fn list_ids(&self) -> Vec<ListId> {
        self.lists.iter().map(|l| l.id.clone()).collect()
    }

    /// Finds a card and the list holding it.
    pub fn find_card(&self, card_id: &str) -> Option<(&List, &Card)> {
        self.lists
            .iter()
            .find_map(|list| list.card(card_id).map(|card| (list, card)))
    }

    pub fn find_card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        self.lists
            .iter_mut()
            .find_map(|list| list.cards.iter_mut().find(|c| c.id == card_id))
    }

    /// Finds a card the backend already knows about. Temporary cards only
    /// exist locally, so commands naming them are rejected.
    pub fn persisted_card(&self, card_id: &str) -> BoardResult<(&List, &Card)> {
        let (list, card) = self
            .find_card(card_id)
            .ok_or_else(|| BoardError::NotFound(format!("card {}", card_id)))?;
        if card.is_temporary() {
            return Err(BoardError::Validation(format!(
                "card {} has not been saved yet",
                card_id
            )));
        }
        Ok((list, card))
    }

    pub fn contains_card(&self, card_id: &str) -> bool {
        self.find_card(card_id).is_some()
    }

    pub fn card_total(&self) -> usize {
        self.lists.iter().map(|l| l.cards.len()).sum()
    }

    pub fn temporary_cards(&self) -> impl Iterator<Item = &Card> {
        self.lists
            .iter()
            .flat_map(|l| l.cards.iter())
            .filter(|c| c.is_temporary())
    }

    /// Mints a temporary card whose id is not already used on this board.
    pub fn mint_temporary_card(&self, name: String, description: Option<String>) -> Card {
        loop {
            let card = Card::temporary(name.clone(), description.clone());
            if !self.contains_card(&card.id) {
                return card;
            }
        }
    }
}
