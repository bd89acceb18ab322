use crate::traits::{ChangeDetector, DataSource};
use mirrorboard_core::{BoardError, BoardResult};
use mirrorboard_domain::RecordSet;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

/// Pushes a record set downstream on startup and after every detected change
pub struct SourceFeed {
    source: Arc<dyn DataSource>,
    detector: Arc<dyn ChangeDetector>,
}

impl SourceFeed {
    pub fn new(source: Arc<dyn DataSource>, detector: Arc<dyn ChangeDetector>) -> Self {
        Self { source, detector }
    }

    /// Runs until the detector or the receiving side goes away.
    ///
    /// The initial load must succeed. Later load failures (a half-written
    /// file, say) are logged and the previous records stay in effect.
    pub async fn run(self, tx: mpsc::Sender<RecordSet>) -> BoardResult<()> {
        let mut events = self.detector.subscribe();

        let initial = self.source.load().await?;
        if tx.send(initial).await.is_err() {
            return Ok(());
        }

        loop {
            let reload = match events.recv().await {
                Ok(event) => {
                    tracing::debug!("Change detected at {}", event.path.display());
                    self.source.load_if_changed().await
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} change events, reloading", skipped);
                    self.source.load().await.map(Some)
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Change detector closed, stopping feed");
                    return Ok(());
                }
            };

            match reload {
                Ok(Some(records)) => {
                    if tx.send(records).await.is_err() {
                        tracing::debug!("Feed receiver dropped");
                        return Ok(());
                    }
                }
                Ok(None) => {}
                Err(BoardError::Serialization(e)) => {
                    tracing::warn!("Ignoring unreadable update from {}: {}", self.source.describe(), e);
                }
                Err(e) => {
                    tracing::error!("Failed to reload {}: {}", self.source.describe(), e);
                }
            }
        }
    }
}
