use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod backend;
pub mod enumerate;
pub mod extract;
mod pipeline;
pub mod progress;
pub mod scan;

// Re-export for convenience
pub use backend::{DocumentExtractor, ExtractError, Extractors, PlainTextExtractor};
pub use enumerate::enumerate_corpus;
pub use extract::{ExtractOptions, ExtractOutcome, extract};
pub use progress::{ProgressSnapshot, ProgressTracker};
pub use scan::{ScanOptions, ScanOutcome, scan};

/// Document formats the scanner recognizes.
///
/// Derived from the file extension at enumeration time; files with any other
/// extension are excluded from the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    /// Classify a path by its extension (ASCII case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?;
        if ext.eq_ignore_ascii_case("txt") {
            Some(DocumentKind::PlainText)
        } else if ext.eq_ignore_ascii_case("pdf") {
            Some(DocumentKind::Pdf)
        } else {
            None
        }
    }
}

/// One file queued for processing by a pipeline.
///
/// Created by [`enumerate_corpus`], consumed by exactly one worker.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub path: PathBuf,
    pub kind: DocumentKind,
    /// Final path segment, used for reporting and output naming.
    pub name: String,
}

impl WorkItem {
    pub fn new(path: PathBuf, kind: DocumentKind) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, kind, name }
    }
}

/// A per-item failure recorded during a run.
///
/// Failures never abort the batch; they are collected and returned on the
/// outcome so callers can distinguish "no match" from "could not read".
#[derive(Debug)]
pub struct ItemFailure {
    pub name: String,
    pub error: ExtractError,
}

/// Progress events emitted during a run.
///
/// The core never renders UI; it emits these through a callback and the
/// caller marshals them to whatever presentation context it uses.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started {
        total: usize,
    },
    /// One item finished (matched, unmatched, written, skipped, or failed).
    Progress {
        completed: usize,
        total: usize,
        fraction: f64,
    },
    Match {
        name: String,
    },
    Written {
        name: String,
    },
    Skipped {
        name: String,
    },
    Failure {
        name: String,
        cause: String,
    },
    Finished {
        cancelled: bool,
    },
}

/// Fatal errors that abort a run before any worker starts.
///
/// Per-item extraction and write failures are *not* represented here — they
/// are collected as [`ItemFailure`]s on the outcome and the batch continues.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("search term is empty")]
    EmptySearchTerm,
    #[error("destination path is empty")]
    EmptyDestination,
    #[error("folder not found: {0}")]
    RootNotFound(PathBuf),
    #[error("failed to enumerate {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("failed to create destination {path}: {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Default worker count: available parallelism, falling back to 4.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod kind_tests {
    use super::*;

    #[test]
    fn recognizes_txt_and_pdf() {
        assert_eq!(
            DocumentKind::from_path(Path::new("/a/notes.txt")),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("/a/paper.pdf")),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(
            DocumentKind::from_path(Path::new("REPORT.TXT")),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("Scan.PdF")),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn unrecognized_extensions_are_excluded() {
        assert_eq!(DocumentKind::from_path(Path::new("image.png")), None);
        assert_eq!(DocumentKind::from_path(Path::new("no_extension")), None);
        assert_eq!(DocumentKind::from_path(Path::new("archive.txt.gz")), None);
    }

    #[test]
    fn work_item_name_is_final_segment() {
        let item = WorkItem::new(PathBuf::from("/corpus/sub/doc.pdf"), DocumentKind::Pdf);
        assert_eq!(item.name, "doc.pdf");
    }
}
