use crate::traits::DataSource;
use crate::watch::FileFingerprint;
use mirrorboard_core::{BoardError, BoardResult};
use mirrorboard_domain::RecordSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Reads the published state map from a JSON file
///
/// The file holds either an object keyed by entity id or an array of
/// records. Record order in the file is preserved.
#[derive(Debug)]
pub struct JsonFileSource {
    path: PathBuf,
    last_loaded: Mutex<Option<FileFingerprint>>,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            last_loaded: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse(bytes: &[u8]) -> BoardResult<RecordSet> {
        serde_json::from_slice(bytes).map_err(|e| BoardError::Serialization(e.to_string()))
    }

    async fn read(&self) -> BoardResult<(RecordSet, Option<FileFingerprint>)> {
        let fingerprint = FileFingerprint::from_file(&self.path).ok();
        let bytes = tokio::fs::read(&self.path).await?;
        let records = Self::parse(&bytes)?;

        tracing::debug!(
            "Loaded {} records ({} bytes) from {}",
            records.len(),
            bytes.len(),
            self.path.display()
        );
        Ok((records, fingerprint))
    }
}

#[async_trait::async_trait]
impl DataSource for JsonFileSource {
    async fn load(&self) -> BoardResult<RecordSet> {
        let (records, fingerprint) = self.read().await?;
        *self.last_loaded.lock().await = fingerprint;
        Ok(records)
    }

    async fn load_if_changed(&self) -> BoardResult<Option<RecordSet>> {
        let mut last_loaded = self.last_loaded.lock().await;
        if let Some(previous) = last_loaded.as_ref() {
            if !previous.has_changed(&self.path)? {
                tracing::debug!("{} unchanged, skipping reload", self.path.display());
                return Ok(None);
            }
        }

        let (records, fingerprint) = self.read().await?;
        *last_loaded = fingerprint;
        Ok(Some(records))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const STATES: &str = r#"{
        "sensor.trello_board_b1": {
            "state": "ok",
            "attributes": {
                "board_data": {
                    "id": "b1",
                    "name": "Roadmap",
                    "lists": {"l1": {"id": "l1", "name": "Todo", "card_count": 0, "cards": []}}
                }
            }
        }
    }"#;

    #[tokio::test]
    async fn test_load_state_map() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("states.json");
        tokio::fs::write(&file_path, STATES).await.unwrap();

        let source = JsonFileSource::new(&file_path);
        let records = source.load().await.unwrap();

        assert_eq!(records.len(), 1);
        let record = records.get("sensor.trello_board_b1").unwrap();
        assert_eq!(record.attributes.board_data.as_ref().unwrap().name, "Roadmap");
    }

    #[tokio::test]
    async fn test_load_if_changed_skips_unchanged_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("states.json");
        tokio::fs::write(&file_path, STATES).await.unwrap();

        let source = JsonFileSource::new(&file_path);
        assert!(source.load_if_changed().await.unwrap().is_some());
        assert!(source.load_if_changed().await.unwrap().is_none());

        tokio::fs::write(&file_path, "[]").await.unwrap();
        let reloaded = source.load_if_changed().await.unwrap().unwrap();
        assert!(reloaded.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_is_serialization_error() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("states.json");
        tokio::fs::write(&file_path, "{not json").await.unwrap();

        let err = JsonFileSource::new(&file_path).load().await.unwrap_err();
        assert!(matches!(err, BoardError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = JsonFileSource::new(dir.path().join("absent.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Io(_)));
    }
}
