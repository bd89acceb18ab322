use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub type CardId = String;

/// Prefix of locally minted card ids. Backend ids never carry it.
pub const TEMP_CARD_PREFIX: &str = "temp-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub id: CardId,
    #[serde(default)]
    pub name: String,
    #[serde(
        rename = "desc",
        alias = "description",
        default,
        deserialize_with = "non_empty_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        rename = "due",
        alias = "due_date",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    /// Upstream fields this model does not name, kept for change detection.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn non_empty_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(text.filter(|s| !s.is_empty()))
}

impl Card {
    pub fn new(id: impl Into<CardId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            due_date: None,
            extra: Map::new(),
        }
    }

    /// A placeholder card shown until the backend-assigned card arrives.
    pub fn temporary(name: String, description: Option<String>) -> Self {
        Self {
            id: format!("{}{}", TEMP_CARD_PREFIX, Uuid::new_v4()),
            name,
            description: description.filter(|d| !d.is_empty()),
            due_date: None,
            extra: Map::new(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.id.starts_with(TEMP_CARD_PREFIX)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into()).filter(|d| !d.is_empty());
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn update_text(&mut self, name: String, description: Option<String>) {
        self.name = name;
        self.description = description.filter(|d| !d.is_empty());
    }
}
