//! Bulk-extract mode: write every PDF's extracted text into a destination
//! tree of `.txt` files.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::backend::{ExtractError, Extractors};
use crate::pipeline::{queue_items, report_item_done};
use crate::progress::ProgressTracker;
use crate::{CorpusError, DocumentKind, ItemFailure, ProgressEvent, WorkItem, enumerate_corpus};

/// Options for a bulk-extract run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub root: PathBuf,
    /// Folder the `.txt` files are written into; created if missing.
    pub destination: PathBuf,
    pub recursive: bool,
    /// Skip documents whose output file already exists instead of
    /// re-extracting and overwriting. Skipped items still count as completed
    /// for progress purposes.
    pub skip_duplicates: bool,
    pub workers: usize,
}

impl ExtractOptions {
    pub fn new(root: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            destination: destination.into(),
            recursive: false,
            skip_duplicates: false,
            workers: crate::default_workers(),
        }
    }
}

/// Outcome of a bulk-extract run.
#[derive(Debug)]
pub struct ExtractOutcome {
    /// Number of output files newly written (or overwritten).
    pub written: usize,
    /// Number of documents skipped because their output already existed.
    pub skipped: usize,
    pub failures: Vec<ItemFailure>,
    pub completed: usize,
    pub total: usize,
    pub cancelled: bool,
}

/// Whole-run context shared by all extract workers.
struct ExtractState {
    extractors: Extractors,
    destination: PathBuf,
    skip_duplicates: bool,
    tracker: ProgressTracker,
    progress_gate: Mutex<()>,
    written: AtomicUsize,
    skipped: AtomicUsize,
    failures: Mutex<Vec<ItemFailure>>,
    progress: Arc<dyn Fn(ProgressEvent) + Send + Sync>,
    cancel: CancellationToken,
}

/// Extract the text of every PDF under a root into `destination/<name>.txt`.
///
/// The output name keeps the source file's extension (`report.pdf` becomes
/// `report.pdf.txt`). Decode and write failures are recorded per item and do
/// not abort the batch; cancellation behaves as in [`crate::scan`].
pub async fn extract(
    options: ExtractOptions,
    extractors: Extractors,
    progress: impl Fn(ProgressEvent) + Send + Sync + 'static,
    cancel: CancellationToken,
) -> Result<ExtractOutcome, CorpusError> {
    if options.destination.as_os_str().is_empty() {
        return Err(CorpusError::EmptyDestination);
    }

    let items = enumerate_corpus(&options.root, options.recursive, &[DocumentKind::Pdf])?;
    let total = items.len();

    std::fs::create_dir_all(&options.destination).map_err(|source| {
        CorpusError::CreateDestination {
            path: options.destination.clone(),
            source,
        }
    })?;

    let progress: Arc<dyn Fn(ProgressEvent) + Send + Sync> = Arc::new(progress);
    progress(ProgressEvent::Started { total });

    let state = Arc::new(ExtractState {
        extractors,
        destination: options.destination,
        skip_duplicates: options.skip_duplicates,
        tracker: ProgressTracker::new(total),
        progress_gate: Mutex::new(()),
        written: AtomicUsize::new(0),
        skipped: AtomicUsize::new(0),
        failures: Mutex::new(Vec::new()),
        progress: Arc::clone(&progress),
        cancel: cancel.clone(),
    });

    let rx = queue_items(items);
    let workers = options.workers.max(1);
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        handles.push(tokio::spawn(extract_worker(rx.clone(), Arc::clone(&state))));
    }
    drop(rx);

    for handle in handles {
        let _ = handle.await;
    }

    let cancelled = cancel.is_cancelled();
    progress(ProgressEvent::Finished { cancelled });

    let failures = std::mem::take(&mut *state.failures.lock().unwrap_or_else(|e| e.into_inner()));
    let written = state.written.load(Ordering::Acquire);
    let skipped = state.skipped.load(Ordering::Acquire);

    tracing::info!(
        total,
        completed = state.tracker.completed(),
        written,
        skipped,
        failures = failures.len(),
        cancelled,
        "extract finished"
    );

    Ok(ExtractOutcome {
        written,
        skipped,
        failures,
        completed: state.tracker.completed(),
        total,
        cancelled,
    })
}

async fn extract_worker(rx: async_channel::Receiver<WorkItem>, state: Arc<ExtractState>) {
    while let Ok(item) = rx.recv().await {
        if state.cancel.is_cancelled() {
            tracing::debug!(name = %item.name, "skipping: cancelled");
            break;
        }

        let out_path = state.destination.join(format!("{}.txt", item.name));

        if state.skip_duplicates && out_path.exists() {
            state.skipped.fetch_add(1, Ordering::AcqRel);
            (state.progress)(ProgressEvent::Skipped {
                name: item.name.clone(),
            });
        } else {
            match extract_and_write(&state.extractors, &item, out_path).await {
                Ok(()) => {
                    state.written.fetch_add(1, Ordering::AcqRel);
                    (state.progress)(ProgressEvent::Written {
                        name: item.name.clone(),
                    });
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
                            name: item.name.clone(),
                            error: err,
                        });
                }
            }
        }

        // Skipped, written, and failed items all advance the completed count.
        report_item_done(&state.tracker, &state.progress_gate, state.progress.as_ref());
    }
}

/// Decode one document and write its text, as a single awaited blocking unit.
async fn extract_and_write(
    extractors: &Extractors,
    item: &WorkItem,
    out_path: PathBuf,
) -> Result<(), ExtractError> {
    let extractor = extractors.for_kind(item.kind);
    let path = item.path.clone();
    match tokio::task::spawn_blocking(move || {
        let text = extractor.extract_text(&path)?;
        std::fs::write(&out_path, text)?;
        Ok(())
    })
    .await
    {
        Ok(result) => result,
        Err(join_err) => Err(ExtractError::Decode(format!(
            "extraction task failed: {join_err}"
        ))),
    }
}
