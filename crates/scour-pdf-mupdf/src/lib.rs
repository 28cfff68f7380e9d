use std::path::Path;

use mupdf::{Document, TextPageFlags};

use scour_core::{DocumentExtractor, ExtractError};

/// MuPDF-based implementation of [`DocumentExtractor`] for PDF documents.
///
/// This crate is the sole AGPL island — it isolates the mupdf dependency so
/// that the scanner core and plain-text code paths do not transitively
/// depend on it.
///
/// Pages are extracted in page order and joined with a newline separator.
/// A failure on any page fails the whole document: callers must treat a
/// decode failure as a failed item, never as "no match".
#[derive(Debug, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentExtractor for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ExtractError::Decode("invalid path encoding".into()))?;

        // Document is closed on every exit path when it drops.
        let document =
            Document::open(path_str).map_err(|e| ExtractError::Decode(e.to_string()))?;

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| ExtractError::Decode(e.to_string()))?
        {
            let page = page_result.map_err(|e| ExtractError::Decode(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| ExtractError::Decode(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        // Ligatures would otherwise hide matches from substring search
        // ("ﬁle" never contains "file").
        Ok(expand_ligatures(&pages_text.join("\n")))
    }
}

/// Expand common typographic ligatures found in PDFs.
fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}
