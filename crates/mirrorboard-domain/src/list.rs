use crate::card::{Card, CardId};
use crate::ordered::Keyed;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type ListId = String;

/// A board column.
///
/// `card_count` comes from the feed independently of `cards` and may lag
/// behind it. It is a display hint and is only adjusted explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawList")]
pub struct List {
    pub id: ListId,
    pub name: String,
    pub card_count: u32,
    pub cards: Vec<Card>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawList {
    #[serde(default)]
    id: ListId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    card_count: Option<Value>,
    #[serde(default)]
    cards: Vec<Card>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawList> for List {
    fn from(raw: RawList) -> Self {
        let card_count = raw
            .card_count
            .as_ref()
            .and_then(parse_count)
            .unwrap_or(raw.cards.len() as u32);
        Self {
            id: raw.id,
            name: raw.name,
            card_count,
            cards: raw.cards,
            extra: raw.extra,
        }
    }
}

/// Counts arrive either as numbers or as sensor state strings.
pub fn parse_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl List {
    pub fn new(id: impl Into<ListId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            card_count: 0,
            cards: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Builds a list whose count matches its cards.
    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.card_count = cards.len() as u32;
        self.cards = cards;
        self
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn position_of(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    pub fn push_card(&mut self, card: Card) {
        self.cards.push(card);
        self.card_count += 1;
    }

    /// Removes a card, decrementing the count only when asked to.
    pub fn take_card(&mut self, card_id: &str, adjust_count: bool) -> Option<Card> {
        let pos = self.position_of(card_id)?;
        let card = self.cards.remove(pos);
        if adjust_count {
            self.card_count = self.card_count.saturating_sub(1);
        }
        Some(card)
    }

    /// Puts a card at `index`, or at the end when the list has shrunk
    /// below it. The count is left alone.
    pub fn insert_card_at(&mut self, index: usize, card: Card) {
        let index = index.min(self.cards.len());
        self.cards.insert(index, card);
    }

    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|c| c.id.clone()).collect()
    }
}

impl Keyed for List {
    fn key(&self) -> &str {
        &self.id
    }

    fn assign_key(&mut self, key: String) {
        self.id = key;
    }
}
