use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mirrorboard_core::BoardResult;
use mirrorboard_domain::RecordSet;
use std::path::PathBuf;

/// Trait for the external data source publishing board records
/// Implementations decide where records come from (file, network, etc.)
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Load every record the source currently publishes
    async fn load(&self) -> BoardResult<RecordSet>;

    /// Load only if the source changed since the last successful load
    async fn load_if_changed(&self) -> BoardResult<Option<RecordSet>> {
        self.load().await.map(Some)
    }

    /// Short human-readable name of the source, for logs and messages
    fn describe(&self) -> String;
}

/// Trait for detecting changes to the source file
#[async_trait]
pub trait ChangeDetector: Send + Sync {
    /// Start watching the file for changes
    async fn start_watching(&self, path: PathBuf) -> BoardResult<()>;

    /// Stop watching the file
    async fn stop_watching(&self) -> BoardResult<()>;

    /// Subscribe to change events
    /// Returns a broadcast receiver that yields `ChangeEvent` when the file changes
    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ChangeEvent>;

    /// Check if currently watching
    fn is_watching(&self) -> bool;
}

/// Event indicating a change to the watched file
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Path to the file that changed
    pub path: PathBuf,
    /// When the change was detected
    pub detected_at: DateTime<Utc>,
}
