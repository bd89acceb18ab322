pub mod board;
pub mod card;
pub mod commands;
pub mod comparator;
pub mod list;
pub mod ordered;
pub mod record;
pub mod resolver;
pub mod snapshot;

pub use board::{Board, BoardId};
pub use card::{Card, CardId, TEMP_CARD_PREFIX};
pub use comparator::SnapshotComparator;
pub use list::{List, ListId};
pub use record::{RecordAttributes, RecordSet, SourceRecord};
pub use resolver::{BoardNotFound, BoardResolver};
pub use snapshot::Snapshot;
