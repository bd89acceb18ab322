//! Records published by the external data source.
//!
//! The source is a state map keyed by entity id. A record describing a board
//! carries one of:
//! - a full `board_data` payload,
//! - a `board_id` plus `board_name` (a board-name record),
//! - a list payload (`list_id`, `list_name`, `cards`) tagged with `board_id`,
//!   whose `state` is the list's card count.

use crate::board::Board;
use crate::card::Card;
use crate::ordered::{self, Keyed};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Entity id prefix used by the board integration.
pub const BOARD_ENTITY_PREFIX: &str = "sensor.trello_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub entity_id: String,
    #[serde(default, deserialize_with = "state_text")]
    pub state: String,
    #[serde(default)]
    pub attributes: RecordAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_data: Option<Board>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sensor states are strings, but some feeds publish bare numbers.
fn state_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl SourceRecord {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn with_attributes(mut self, attributes: RecordAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn has_board_data(&self) -> bool {
        self.attributes.board_data.is_some()
    }

    pub fn board_id_matches(&self, board_id: &str) -> bool {
        self.attributes.board_id.as_deref() == Some(board_id)
    }

    /// Whether this record can be offered as a board to display.
    pub fn is_board_candidate(&self) -> bool {
        self.entity_id.starts_with(BOARD_ENTITY_PREFIX)
            && (self.attributes.board_data.is_some() || self.attributes.board_id.is_some())
    }
}

impl Keyed for SourceRecord {
    fn key(&self) -> &str {
        &self.entity_id
    }

    fn assign_key(&mut self, key: String) {
        self.entity_id = key;
    }
}

/// One inbound update: every record the source currently publishes, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub records: Vec<SourceRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<SourceRecord>) -> Self {
        let mut set = Self::default();
        for record in records {
            set.insert(record);
        }
        set
    }

    pub fn insert(&mut self, record: SourceRecord) {
        ordered::upsert(&mut self.records, record);
    }

    pub fn get(&self, entity_id: &str) -> Option<&SourceRecord> {
        self.records.iter().find(|r| r.entity_id == entity_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that can be picked as a board in the configuration editor.
    pub fn board_candidates(&self) -> Vec<&SourceRecord> {
        self.records.iter().filter(|r| r.is_board_candidate()).collect()
    }
}

impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ordered::serialize(&self.records, serializer)
    }
}

impl<'de> Deserialize<'de> for RecordSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            records: ordered::deserialize(deserializer)?,
        })
    }
}
