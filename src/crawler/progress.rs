//! Live progress counters
//!
//! The coordinator updates these from concurrent fetch tasks; a reporter can
//! read them at any time from another task or thread.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Pages discovered and pages fetched during the current run
///
/// Both counters only grow while a run is in progress. The root page is
/// fetched without ever being counted as discovered, so `pages_visited`
/// can end up one above `pages_to_visit`.
#[derive(Debug, Default)]
pub struct Progress {
    pages_to_visit: AtomicUsize,
    pages_visited: AtomicUsize,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of addresses queued for a later round so far
    pub fn pages_to_visit(&self) -> usize {
        self.pages_to_visit.load(Ordering::Relaxed)
    }

    /// Number of fetches completed so far, failed ones included
    pub fn pages_visited(&self) -> usize {
        self.pages_visited.load(Ordering::Relaxed)
    }

    /// Returns `(pages_visited, pages_to_visit)`
    pub fn snapshot(&self) -> (usize, usize) {
        (self.pages_visited(), self.pages_to_visit())
    }

    pub(crate) fn record_discovered(&self) {
        self.pages_to_visit.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_visited(&self) {
        self.pages_visited.fetch_add(1, Ordering::Relaxed);
    }

    /// Clears both counters at the start of a run
    pub(crate) fn reset(&self) {
        self.pages_to_visit.store(0, Ordering::Relaxed);
        self.pages_visited.store(0, Ordering::Relaxed);
    }
}
