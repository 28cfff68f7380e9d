use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::DocumentKind;

/// A per-document extraction failure.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to decode document: {0}")]
    Decode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document text extraction backends.
///
/// One implementation per [`DocumentKind`]; implementors must open and close
/// any underlying handle within the call, releasing it on every exit path.
pub trait DocumentExtractor: Send + Sync {
    /// Extract the full text content of a document.
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Reads plain-text documents in full.
///
/// Documents are assumed to fit in memory; streaming huge files is out of
/// scope. Non-UTF-8 content fails with [`ExtractError::Io`].
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Capability table mapping each [`DocumentKind`] to its extractor.
///
/// Built by the caller and passed into the pipelines, so the PDF decoder
/// stays pluggable (tests substitute a scripted fake) and adding a format
/// does not touch pipeline call sites.
#[derive(Clone)]
pub struct Extractors {
    plain_text: Arc<dyn DocumentExtractor>,
    pdf: Arc<dyn DocumentExtractor>,
}

impl Extractors {
    pub fn new(plain_text: Arc<dyn DocumentExtractor>, pdf: Arc<dyn DocumentExtractor>) -> Self {
        Self { plain_text, pdf }
    }

    /// Table with the built-in plain-text reader and the given PDF backend.
    pub fn with_pdf(pdf: Arc<dyn DocumentExtractor>) -> Self {
        Self::new(Arc::new(PlainTextExtractor), pdf)
    }

    pub fn for_kind(&self, kind: DocumentKind) -> Arc<dyn DocumentExtractor> {
        match kind {
            DocumentKind::PlainText => Arc::clone(&self.plain_text),
            DocumentKind::Pdf => Arc::clone(&self.pdf),
        }
    }
}
