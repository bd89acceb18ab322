use crate::board::Board;
use crate::snapshot::Snapshot;
use mirrorboard_core::{BoardError, BoardResult};
use serde_json::Value;

/// Field-name fragments that mark upstream bookkeeping. Matched case-insensitively
/// with underscores ignored, so `last_updated` and `lastUpdated` are both volatile.
pub const DEFAULT_VOLATILE_MARKERS: &[&str] = &[
    "lastupdated",
    "updatedat",
    "lastrefresh",
    "refreshedat",
    "lastchanged",
    "lastactivity",
    "lastsync",
    "fetchedat",
    "timestamp",
];

/// Decides whether a newly resolved board differs meaningfully from the last
/// rendered one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotComparator {
    markers: Vec<String>,
}

impl Default for SnapshotComparator {
    fn default() -> Self {
        Self::with_markers(DEFAULT_VOLATILE_MARKERS.iter().copied())
    }
}

impl SnapshotComparator {
    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers.into_iter().map(|m| fold(m.as_ref())).collect(),
        }
    }

    pub fn is_volatile(&self, field: &str) -> bool {
        let folded = fold(field);
        self.markers.iter().any(|m| folded.contains(m.as_str()))
    }

    pub fn has_changed(&self, previous: Option<&Board>, next: Option<&Board>) -> bool {
        match (previous, next) {
            (None, None) => false,
            (None, Some(_)) | (Some(_), None) => true,
            (Some(previous), Some(next)) => {
                match (self.canonical_form(previous), self.canonical_form(next)) {
                    (Ok(a), Ok(b)) => a != b,
                    (Err(e), _) | (_, Err(e)) => {
                        tracing::warn!("Treating board as changed, normalization failed: {}", e);
                        true
                    }
                }
            }
        }
    }

    pub fn has_snapshot_changed(&self, previous: Option<&Snapshot>, next: Option<&Snapshot>) -> bool {
        match (previous, next) {
            (None, None) => false,
            (None, Some(_)) | (Some(_), None) => true,
            (Some(previous), Some(next)) => match (previous.canonical(), next.canonical()) {
                (Some(a), Some(b)) => a != b,
                _ => true,
            },
        }
    }

    /// The board as a JSON tree with volatile fields removed at every depth.
    /// Lists stay an array so column order is part of the comparison.
    pub fn normalize(&self, board: &Board) -> BoardResult<Value> {
        let mut value =
            serde_json::to_value(board).map_err(|e| BoardError::Serialization(e.to_string()))?;
        let lists = board
            .lists
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BoardError::Serialization(e.to_string()))?;
        if let Value::Object(map) = &mut value {
            map.insert("lists".to_string(), Value::Array(lists));
        }
        self.strip(&mut value);
        Ok(value)
    }

    /// Deterministic serialization of the normalized board. Object keys are
    /// emitted in sorted order, so equal structures serialize identically.
    pub fn canonical_form(&self, board: &Board) -> BoardResult<String> {
        let value = self.normalize(board)?;
        serde_json::to_string(&value).map_err(|e| BoardError::Serialization(e.to_string()))
    }

    fn strip(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                map.retain(|key, _| !self.is_volatile(key));
                map.values_mut().for_each(|v| self.strip(v));
            }
            Value::Array(items) => items.iter_mut().for_each(|v| self.strip(v)),
            _ => {}
        }
    }
}

fn fold(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::list::List;
    use serde_json::json;

    fn board() -> Board {
        Board::new("b1", "Roadmap")
            .with_list(List::new("l1", "Todo").with_cards(vec![Card::new("c1", "Write docs")]))
            .with_list(List::new("l2", "Done"))
    }

    #[test]
    fn test_first_observation_and_absence() {
        let comparator = SnapshotComparator::default();
        assert!(comparator.has_changed(None, Some(&board())));
        assert!(comparator.has_changed(Some(&board()), None));
        assert!(!comparator.has_changed(None, None));
    }

    #[test]
    fn test_volatile_fields_ignored() {
        let comparator = SnapshotComparator::default();
        let mut a = board();
        let mut b = board();
        a.extra.insert("last_updated".into(), json!("2024-01-01T00:00:00Z"));
        b.extra.insert("last_updated".into(), json!("2024-01-01T00:05:00Z"));
        a.lists[0].cards[0]
            .extra
            .insert("dateLastActivity".into(), json!("2024-01-01T00:00:00Z"));
        b.lists[0].cards[0]
            .extra
            .insert("dateLastActivity".into(), json!("2024-02-01T00:00:00Z"));

        assert!(!comparator.has_changed(Some(&a), Some(&b)));
    }

    #[test]
    fn test_structural_changes_detected() {
        let comparator = SnapshotComparator::default();
        let base = board();

        let mut renamed = board();
        renamed.lists[1].name = "Shipped".into();
        assert!(comparator.has_changed(Some(&base), Some(&renamed)));

        let mut recounted = board();
        recounted.lists[0].card_count = 3;
        assert!(comparator.has_changed(Some(&base), Some(&recounted)));

        let mut edited = board();
        edited.lists[0].cards[0].description = Some("now with details".into());
        assert!(comparator.has_changed(Some(&base), Some(&edited)));

        let mut extra_field = board();
        extra_field.extra.insert("closed".into(), json!(true));
        assert!(comparator.has_changed(Some(&base), Some(&extra_field)));
    }

    #[test]
    fn test_column_order_is_meaningful() {
        let comparator = SnapshotComparator::default();
        let base = board();
        let mut reordered = board();
        reordered.lists.reverse();
        assert!(comparator.has_changed(Some(&base), Some(&reordered)));
    }

    #[test]
    fn test_canonical_form_is_deterministic() {
        let comparator = SnapshotComparator::default();
        let mut a = board();
        a.extra.insert("zeta".into(), json!(1));
        a.extra.insert("alpha".into(), json!(2));
        let mut b = board();
        b.extra.insert("alpha".into(), json!(2));
        b.extra.insert("zeta".into(), json!(1));

        assert_eq!(
            comparator.canonical_form(&a).unwrap(),
            comparator.canonical_form(&b).unwrap()
        );
    }

    #[test]
    fn test_custom_markers() {
        let comparator = SnapshotComparator::with_markers(["etag"]);
        assert!(comparator.is_volatile("ETag"));
        assert!(!comparator.is_volatile("last_updated"));
        assert!(SnapshotComparator::default().is_volatile("lastUpdated"));
        assert!(!SnapshotComparator::default().is_volatile("due"));
    }
}
