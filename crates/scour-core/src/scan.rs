//! Search mode: find every document whose extracted text contains a
//! case-insensitive substring.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::backend::Extractors;
use crate::pipeline::{extract_text_blocking, queue_items, report_item_done};
use crate::progress::ProgressTracker;
use crate::{CorpusError, DocumentKind, ItemFailure, ProgressEvent, WorkItem, enumerate_corpus};

/// Options for a search run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    /// Substring to search for, matched case-insensitively anywhere in the
    /// document text (a match at offset 0 counts).
    pub term: String,
    pub recursive: bool,
    pub workers: usize,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>, term: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            term: term.into(),
            recursive: false,
            workers: crate::default_workers(),
        }
    }
}

/// Outcome of a search run.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Display names of matching documents, sorted for deterministic output.
    pub matches: Vec<String>,
    pub failures: Vec<ItemFailure>,
    pub completed: usize,
    pub total: usize,
    /// True when the run was cut short by cancellation. Not an error; the
    /// matches found so far are still returned.
    pub cancelled: bool,
}

/// Whole-run context shared by all scan workers.
struct ScanState {
    extractors: Extractors,
    /// Lowercased search term.
    needle: String,
    tracker: ProgressTracker,
    progress_gate: Mutex<()>,
    matches: Mutex<Vec<String>>,
    failures: Mutex<Vec<ItemFailure>>,
    progress: Arc<dyn Fn(ProgressEvent) + Send + Sync>,
    cancel: CancellationToken,
}

/// Search every `.txt` and `.pdf` document under a root for a substring.
///
/// Items are processed on a bounded worker pool. Extraction failures are
/// recorded per item and do not abort the batch. Progress events are emitted
/// via the callback; the run can be cancelled via the token (in-flight
/// extractions finish, no new item starts once cancellation is observed).
pub async fn scan(
    options: ScanOptions,
    extractors: Extractors,
    progress: impl Fn(ProgressEvent) + Send + Sync + 'static,
    cancel: CancellationToken,
) -> Result<ScanOutcome, CorpusError> {
    if options.term.trim().is_empty() {
        return Err(CorpusError::EmptySearchTerm);
    }

    let items = enumerate_corpus(
        &options.root,
        options.recursive,
        &[DocumentKind::PlainText, DocumentKind::Pdf],
    )?;
    let total = items.len();

    let progress: Arc<dyn Fn(ProgressEvent) + Send + Sync> = Arc::new(progress);
    progress(ProgressEvent::Started { total });

    let state = Arc::new(ScanState {
        extractors,
        needle: options.term.to_lowercase(),
        tracker: ProgressTracker::new(total),
        progress_gate: Mutex::new(()),
        matches: Mutex::new(Vec::new()),
        failures: Mutex::new(Vec::new()),
        progress: Arc::clone(&progress),
        cancel: cancel.clone(),
    });

    let rx = queue_items(items);
    let workers = options.workers.max(1);
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        handles.push(tokio::spawn(scan_worker(rx.clone(), Arc::clone(&state))));
    }
    drop(rx);

    for handle in handles {
        let _ = handle.await;
    }

    let cancelled = cancel.is_cancelled();
    progress(ProgressEvent::Finished { cancelled });

    let mut matched = std::mem::take(&mut *state.matches.lock().unwrap_or_else(|e| e.into_inner()));
    matched.sort();
    let failures = std::mem::take(&mut *state.failures.lock().unwrap_or_else(|e| e.into_inner()));

    tracing::info!(
        total,
        completed = state.tracker.completed(),
        matches = matched.len(),
        failures = failures.len(),
        cancelled,
        "scan finished"
    );

    Ok(ScanOutcome {
        matches: matched,
        failures,
        completed: state.tracker.completed(),
        total,
        cancelled,
    })
}

async fn scan_worker(rx: async_channel::Receiver<WorkItem>, state: Arc<ScanState>) {
    while let Ok(item) = rx.recv().await {
        // Checked before starting each item; an in-flight extraction is
        // never interrupted, but no new item starts after cancellation.
        if state.cancel.is_cancelled() {
            tracing::debug!(name = %item.name, "skipping: cancelled");
            break;
        }

        let extractor = state.extractors.for_kind(item.kind);
        match extract_text_blocking(extractor, item.path.clone()).await {
            Ok(text) => {
                if text.to_lowercase().contains(state.needle.as_str()) {
                    state
                        .matches
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .push(item.name.clone());
                    (state.progress)(ProgressEvent::Match {
                        name: item.name.clone(),
                    });
                }
            }
            Err(err) => {
                tracing::debug!(name = %item.name, error = %err, "extraction failed");
                (state.progress)(ProgressEvent::Failure {
                    name: item.name.clone(),
                    cause: err.to_string(),
                });
                state
                    .failures
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(ItemFailure {
                        name: item.name,
                        error: err,
                    });
            }
        }

        report_item_done(&state.tracker, &state.progress_gate, state.progress.as_ref());
    }
}
