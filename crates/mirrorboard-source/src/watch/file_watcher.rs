use crate::traits::{ChangeDetector, ChangeEvent};
use chrono::Utc;
use mirrorboard_core::{BoardError, BoardResult};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::Mutex;

/// Watches the published state file and broadcasts a [`ChangeEvent`] each
/// time it is written or replaced.
///
/// The parent directory is watched rather than the file itself, so sources
/// that replace the file by rename are still seen.
pub struct FileWatcher {
    tx: broadcast::Sender<ChangeEvent>,
    task_handle: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    watching: Arc<AtomicBool>,
}

impl FileWatcher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            tx,
            task_handle: Arc::new(Mutex::new(None)),
            watching: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for FileWatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes and creations of `target` count; reads, removals and sibling
/// files in the directory do not.
fn touches(event: &Event, target: &Path) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event.paths.iter().any(|p| p == target)
}

/// Holds a directory watch open until the task is aborted.
async fn watch_directory(
    directory: PathBuf,
    target: PathBuf,
    tx: broadcast::Sender<ChangeEvent>,
    watching: Arc<AtomicBool>,
) {
    let handler = move |res: notify::Result<Event>| match res {
        Ok(event) if touches(&event, &target) => {
            let _ = tx.send(ChangeEvent {
                path: target.clone(),
                detected_at: Utc::now(),
            });
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("State file watch error: {}", e),
    };

    let mut watcher = match notify::recommended_watcher(handler) {
        Ok(watcher) => watcher,
        Err(e) => {
            tracing::error!("Could not create a file watcher: {}", e);
            return;
        }
    };
    if let Err(e) = watcher.watch(&directory, RecursiveMode::NonRecursive) {
        tracing::error!("Could not watch {}: {}", directory.display(), e);
        return;
    }

    tracing::info!("Watching {} for state changes", directory.display());
    watching.store(true, Ordering::SeqCst);
    std::future::pending::<()>().await;
}

#[async_trait::async_trait]
impl ChangeDetector for FileWatcher {
    async fn start_watching(&self, path: PathBuf) -> BoardResult<()> {
        // Event paths are absolute
        let target = tokio::fs::canonicalize(&path).await?;
        let directory = target.parent().map(Path::to_path_buf).ok_or_else(|| {
            BoardError::Internal(format!("{} has no parent directory", path.display()))
        })?;

        let handle = tokio::spawn(watch_directory(
            directory,
            target,
            self.tx.clone(),
            self.watching.clone(),
        ));

        if let Some(previous) = self.task_handle.lock().await.replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    async fn stop_watching(&self) -> BoardResult<()> {
        if let Some(handle) = self.task_handle.lock().await.take() {
            handle.abort();
            self.watching.store(false, Ordering::SeqCst);
            tracing::info!("Stopped watching the state file");
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    fn is_watching(&self) -> bool {
        self.watching.load(Ordering::SeqCst)
    }
}
