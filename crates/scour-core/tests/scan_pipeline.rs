//! Integration tests for the scan pipeline.
//!
//! PDF decoding is substituted with a scripted backend that reads the file
//! as plain text, failing for any name containing "corrupt", so no real PDF
//! fixtures are needed.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use scour_core::{
    CorpusError, DocumentExtractor, ExtractError, Extractors, ProgressEvent, ScanOptions, scan,
};

struct FakePdf;

impl DocumentExtractor for FakePdf {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let name = path.file_name().unwrap().to_string_lossy();
        if name.contains("corrupt") {
            return Err(ExtractError::Decode("damaged xref table".into()));
        }
        Ok(std::fs::read_to_string(path)?)
    }
}

fn extractors() -> Extractors {
    Extractors::with_pdf(Arc::new(FakePdf))
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

#[tokio::test]
async fn blank_term_rejected_before_enumeration() {
    // Root deliberately does not exist: the term check must fire first.
    let options = ScanOptions::new("/nonexistent/corpus", "   ");
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = Arc::clone(&events);

    let err = scan(
        options,
        extractors(),
        move |event| events_clone.lock().unwrap().push(event),
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CorpusError::EmptySearchTerm));
    assert!(events.lock().unwrap().is_empty(), "no work should start");
}

#[tokio::test]
async fn missing_root_fails() {
    let err = scan(
        ScanOptions::new("/nonexistent/corpus", "needle"),
        extractors(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CorpusError::RootNotFound(_)));
}

#[tokio::test]
async fn matching_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "upper.txt", "QUARTERLY REPORT, FINAL");
    write(dir.path(), "lower.txt", "nothing to see here");

    let outcome = scan(
        ScanOptions::new(dir.path(), "Report"),
        extractors(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.matches, ["upper.txt"]);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.completed, 2);
    assert!(!outcome.cancelled);
}

#[tokio::test]
async fn match_at_document_start_counts() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lead.txt", "report starts this file");

    let outcome = scan(
        ScanOptions::new(dir.path(), "report"),
        extractors(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.matches, ["lead.txt"]);
}

#[tokio::test]
async fn absent_term_yields_no_matches_and_no_failures() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.txt", "alpha beta");
    write(dir.path(), "b.pdf", "gamma delta");

    let outcome = scan(
        ScanOptions::new(dir.path(), "xyz123"),
        extractors(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(outcome.matches.is_empty());
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.completed, outcome.total);
}

#[tokio::test]
async fn pdfs_and_text_files_are_both_searched() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "notes.txt", "the needle is here");
    write(dir.path(), "paper.pdf", "a NEEDLE in page text");
    write(dir.path(), "other.pdf", "no match");

    let outcome = scan(
        ScanOptions::new(dir.path(), "needle"),
        extractors(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    // Sorted, regardless of completion order.
    assert_eq!(outcome.matches, ["notes.txt", "paper.pdf"]);
}

#[tokio::test]
async fn corrupt_document_is_a_failure_not_a_non_match() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..9 {
        write(dir.path(), &format!("doc{i}.txt"), "needle inside");
    }
    write(dir.path(), "corrupt.pdf", "never read");

    let outcome = scan(
        ScanOptions::new(dir.path(), "needle"),
        extractors(),
        |_| {},
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.matches.len(), 9);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].name, "corrupt.pdf");
    assert!(matches!(outcome.failures[0].error, ExtractError::Decode(_)));
    // The batch still runs to completion.
    assert_eq!(outcome.completed, 10);
    assert_eq!(outcome.total, 10);
    assert!(!outcome.cancelled);
}

#[tokio::test]
async fn progress_counts_are_monotonic_and_reach_total() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..6 {
        write(dir.path(), &format!("doc{i}.txt"), "text");
    }

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = Arc::clone(&events);

    let outcome = scan(
        ScanOptions::new(dir.path(), "text"),
        extractors(),
        move |event| events_clone.lock().unwrap().push(event),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let events = events.lock().unwrap();
    assert!(matches!(events.first(), Some(ProgressEvent::Started { total: 6 })));
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Finished { cancelled: false })
    ));

    let counts: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress { completed, .. } => Some(*completed),
            _ => None,
        })
        .collect();
    assert_eq!(counts.len(), 6);
    assert!(counts.windows(2).all(|w| w[0] < w[1]), "counts: {counts:?}");
    assert_eq!(*counts.last().unwrap(), 6);
    assert_eq!(outcome.completed, 6);
}

#[tokio::test]
async fn cancellation_returns_partial_results_without_error() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..8 {
        write(dir.path(), &format!("doc{i}.txt"), "needle");
    }

    // Single worker: cancelling inside the first completion callback means
    // the check at the top of the next iteration must stop the run.
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    let mut options = ScanOptions::new(dir.path(), "needle");
    options.workers = 1;

    let outcome = scan(
        options,
        extractors(),
        move |event| {
            if matches!(event, ProgressEvent::Progress { completed: 1, .. }) {
                cancel_clone.cancel();
            }
        },
        cancel,
    )
    .await
    .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.completed, 1);
    assert_eq!(outcome.total, 8);
    assert_eq!(outcome.matches.len(), 1);
}

#[tokio::test]
async fn cancel_before_start_processes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "doc.txt", "needle");

    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = scan(
        ScanOptions::new(dir.path(), "needle"),
        extractors(),
        |_| {},
        cancel,
    )
    .await
    .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.completed, 0);
    assert!(outcome.matches.is_empty());
}
