use std::path::Path;

use walkdir::WalkDir;

use crate::{CorpusError, DocumentKind, WorkItem};

/// Materialize the list of work items under `root`.
///
/// The list is collected up front so the total count is known before any
/// processing starts. Entry order is filesystem enumeration order and is not
/// guaranteed stable across platforms; results are reported by name, never by
/// position.
///
/// Fails with [`CorpusError::RootNotFound`] if `root` does not exist or is
/// not a directory, and with [`CorpusError::Walk`] if the root itself cannot
/// be read. Unreadable entries below the root are logged and skipped.
pub fn enumerate_corpus(
    root: &Path,
    recursive: bool,
    kinds: &[DocumentKind],
) -> Result<Vec<WorkItem>, CorpusError> {
    if !root.is_dir() {
        return Err(CorpusError::RootNotFound(root.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut items = Vec::new();

    for entry in WalkDir::new(root).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                // An error on the root means no work can begin; anything
                // deeper is a per-entry problem.
                if err.path().is_none_or(|p| p == root) {
                    return Err(CorpusError::Walk {
                        path: root.to_path_buf(),
                        source: err,
                    });
                }
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let Some(kind) = DocumentKind::from_path(entry.path()) else {
            continue;
        };
        if kinds.contains(&kind) {
            items.push(WorkItem::new(entry.into_path(), kind));
        }
    }

    tracing::debug!(root = %root.display(), count = items.len(), recursive, "enumerated corpus");
    Ok(items)
}
