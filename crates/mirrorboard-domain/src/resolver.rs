//! Turns a board reference into a board snapshot.
//!
//! A canonical entity reference resolves only through its own record: either
//! the record's `board_data` payload, or the legacy `board_id` it points at.
//! A legacy board id is looked up first as a payload record whose entity id
//! encodes the board, then reconstructed from per-list records.

use crate::board::Board;
use crate::list::{parse_count, List};
use crate::ordered;
use crate::record::{RecordSet, SourceRecord};
use mirrorboard_core::{BoardError, BoardReference};
use serde_json::{Map, Value};
use thiserror::Error;

/// No resolution path found the board. Names the identifier that was attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("board not found: {reference}")]
pub struct BoardNotFound {
    pub reference: BoardReference,
}

impl From<BoardNotFound> for BoardError {
    fn from(err: BoardNotFound) -> Self {
        BoardError::NotFound(err.reference.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardResolver {
    reference: BoardReference,
}

impl BoardResolver {
    pub fn new(reference: BoardReference) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &BoardReference {
        &self.reference
    }

    pub fn resolve(&self, records: &RecordSet) -> Result<Board, BoardNotFound> {
        match &self.reference {
            BoardReference::Entity(entity_id) => Self::resolve_entity(records, entity_id),
            BoardReference::LegacyBoardId(board_id) => Self::resolve_board_id(records, board_id),
        }
    }

    pub fn resolve_entity(records: &RecordSet, entity_id: &str) -> Result<Board, BoardNotFound> {
        let not_found = || BoardNotFound {
            reference: BoardReference::Entity(entity_id.to_string()),
        };

        let record = records.get(entity_id).ok_or_else(|| {
            tracing::debug!("Entity {} is not published by the source", entity_id);
            not_found()
        })?;

        if let Some(board) = &record.attributes.board_data {
            tracing::debug!("Resolved {} from its board payload", entity_id);
            return Ok(board.clone());
        }

        match &record.attributes.board_id {
            Some(board_id) => {
                tracing::debug!("Entity {} points at legacy board {}", entity_id, board_id);
                Self::resolve_board_id(records, board_id)
            }
            None => {
                tracing::debug!("Entity {} carries no board data", entity_id);
                Err(not_found())
            }
        }
    }

    pub fn resolve_board_id(records: &RecordSet, board_id: &str) -> Result<Board, BoardNotFound> {
        let not_found = || BoardNotFound {
            reference: BoardReference::LegacyBoardId(board_id.to_string()),
        };

        let marker = format!("board_{}", board_id);
        let payload = records
            .iter()
            .find(|r| r.entity_id.contains(&marker) && r.has_board_data())
            .and_then(|r| r.attributes.board_data.as_ref());
        if let Some(board) = payload {
            tracing::debug!("Resolved board {} from a payload record", board_id);
            return Ok(board.clone());
        }

        let name_source = records
            .iter()
            .find(|r| r.board_id_matches(board_id))
            .ok_or_else(|| {
                tracing::debug!("No record references board {}", board_id);
                not_found()
            })?;

        let mut lists = Vec::new();
        for record in records
            .iter()
            .filter(|r| r.board_id_matches(board_id) && r.attributes.cards.is_some())
        {
            match list_from_record(record) {
                Some(list) => ordered::upsert(&mut lists, list),
                None => tracing::warn!(
                    "Skipping list record {} without a list id",
                    record.entity_id
                ),
            }
        }

        if lists.is_empty() {
            tracing::debug!("Board {} has a name record but no list records", board_id);
            return Err(not_found());
        }

        tracing::debug!(
            "Reconstructed board {} from {} list records",
            board_id,
            lists.len()
        );
        Ok(Board {
            id: board_id.to_string(),
            name: name_source.attributes.board_name.clone().unwrap_or_default(),
            lists,
            extra: Map::new(),
        })
    }
}

fn list_from_record(record: &SourceRecord) -> Option<List> {
    let attributes = &record.attributes;
    let id = attributes.list_id.clone().filter(|id| !id.is_empty())?;
    let cards = attributes.cards.clone().unwrap_or_default();
    let card_count = parse_count(&Value::String(record.state.clone())).unwrap_or_else(|| {
        tracing::debug!(
            "List {} has a non-numeric state {:?}, counting cards instead",
            id,
            record.state
        );
        cards.len() as u32
    });

    Some(List {
        id,
        name: attributes.list_name.clone().unwrap_or_default(),
        card_count,
        cards,
        extra: Map::new(),
    })
}
