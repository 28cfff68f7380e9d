use std::sync::atomic::{AtomicUsize, Ordering};

/// Thread-safe monotonic counter of completed work items.
///
/// Shared by all workers of one run. Each completion is a single
/// `fetch_add`, so no two callers can observe a non-monotonic or duplicated
/// completed count.
#[derive(Debug)]
pub struct ProgressTracker {
    completed: AtomicUsize,
    total: usize,
}

/// Snapshot returned by [`ProgressTracker::record_completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Record one completed item and return the updated snapshot.
    pub fn record_completed(&self) -> ProgressSnapshot {
        let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        debug_assert!(completed <= self.total);
        ProgressSnapshot {
            completed,
            total: self.total,
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl ProgressSnapshot {
    /// Completed fraction in `[0, 1]`; an empty batch reads as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Human status line, e.g. `3 / 10 (30.00%)`.
    pub fn status_line(&self) -> String {
        format!(
            "{} / {} ({:.2}%)",
            self.completed,
            self.total,
            self.fraction() * 100.0
        )
    }
}
