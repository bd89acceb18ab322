use crate::cli::ReferenceArgs;
use crate::context::CliContext;
use crate::output::TerminalPresenter;
use mirrorboard_source::{ChangeDetector, FileWatcher, JsonFileSource, SourceFeed};
use mirrorboard_sync::ReconciliationLoop;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Builds the loop with the configured board and `[sync]` timings.
fn open_loop(ctx: &CliContext, flags: &ReferenceArgs) -> anyhow::Result<ReconciliationLoop> {
    let reference = ctx.reference(flags)?;
    Ok(ReconciliationLoop::new(
        reference,
        Arc::new(TerminalPresenter),
        ctx.config.sync,
    ))
}

pub async fn handle(ctx: &CliContext, states: &Path, flags: &ReferenceArgs) -> anyhow::Result<()> {
    let reconciler = open_loop(ctx, flags)?;

    let watcher = Arc::new(FileWatcher::new());
    watcher.start_watching(states.to_path_buf()).await?;

    let source = Arc::new(JsonFileSource::new(states));
    let (tx, rx) = mpsc::channel(8);
    let feed = tokio::spawn(SourceFeed::new(source, watcher.clone()).run(tx));

    tokio::select! {
        _ = reconciler.run(rx) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping watch");
            feed.abort();
        }
    }

    watcher.stop_watching().await?;
    match feed.await {
        Ok(result) => result?,
        Err(e) if e.is_cancelled() => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
