//! Shared plumbing for the scan and extract worker pools.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::backend::{DocumentExtractor, ExtractError};
use crate::progress::ProgressTracker;
use crate::{ProgressEvent, WorkItem};

/// Queue the full item list and return the receiver workers drain from.
///
/// The sender is dropped before returning, so the channel closes once the
/// last item is consumed and idle workers exit their recv loop.
pub(crate) fn queue_items(items: Vec<WorkItem>) -> async_channel::Receiver<WorkItem> {
    let (tx, rx) = async_channel::unbounded();
    for item in items {
        // Unbounded channel with a live receiver: send cannot fail.
        let _ = tx.try_send(item);
    }
    rx
}

/// Record one completed item and emit its `Progress` event.
///
/// The increment and the callback run under one gate so the sequence of
/// observed completed counts is non-decreasing; the count itself is still a
/// single atomic `fetch_add`.
pub(crate) fn report_item_done(
    tracker: &ProgressTracker,
    gate: &Mutex<()>,
    progress: &(dyn Fn(ProgressEvent) + Send + Sync),
) {
    let _guard = gate.lock().unwrap_or_else(|e| e.into_inner());
    let snapshot = tracker.record_completed();
    progress(ProgressEvent::Progress {
        completed: snapshot.completed,
        total: snapshot.total,
        fraction: snapshot.fraction(),
    });
}

/// Run one blocking extraction on the blocking pool and await it.
///
/// Each item's extraction is fully awaited before the worker reports the
/// item complete and takes the next one, so "submitted" and "completed" can
/// never drift apart in the progress accounting.
pub(crate) async fn extract_text_blocking(
    extractor: Arc<dyn DocumentExtractor>,
    path: PathBuf,
) -> Result<String, ExtractError> {
    match tokio::task::spawn_blocking(move || extractor.extract_text(&path)).await {
        Ok(result) => result,
        Err(join_err) => Err(ExtractError::Decode(format!(
            "extraction task failed: {join_err}"
        ))),
    }
}
