use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::models::entry::{EntryKind, EntryMeta};

/// Lock-free counters updated from concurrently running visitors.
#[derive(Debug)]
pub struct ProgressTracker {
    pub files_seen: AtomicUsize,
    pub dirs_seen: AtomicUsize,
    pub other_seen: AtomicUsize,
    pub total_size: AtomicU64,
    pub errors_count: AtomicUsize,
    pub start_time: Instant,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            files_seen: AtomicUsize::new(0),
            dirs_seen: AtomicUsize::new(0),
            other_seen: AtomicUsize::new(0),
            total_size: AtomicU64::new(0),
            errors_count: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Count one visited entry by kind; files also add to the byte total.
    pub fn record(&self, meta: &EntryMeta) {
        match meta.kind {
            EntryKind::File => {
                self.files_seen.fetch_add(1, Ordering::Relaxed);
                self.total_size.fetch_add(meta.len, Ordering::Relaxed);
            }
            EntryKind::Directory => {
                self.dirs_seen.fetch_add(1, Ordering::Relaxed);
            }
            EntryKind::Symlink | EntryKind::Other => {
                self.other_seen.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn increment_errors(&self) {
        self.errors_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn entries_per_second(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < f64::EPSILON {
            return 0.0;
        }
        let seen = self.files_seen.load(Ordering::Relaxed)
            + self.dirs_seen.load(Ordering::Relaxed)
            + self.other_seen.load(Ordering::Relaxed);
        seen as f64 / elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            files_seen: self.files_seen.load(Ordering::Relaxed),
            dirs_seen: self.dirs_seen.load(Ordering::Relaxed),
            other_seen: self.other_seen.load(Ordering::Relaxed),
            total_size: self.total_size.load(Ordering::Relaxed),
            errors_count: self.errors_count.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
            entries_per_second: self.entries_per_second(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub files_seen: usize,
    pub dirs_seen: usize,
    pub other_seen: usize,
    pub total_size: u64,
    pub errors_count: usize,
    pub elapsed: Duration,
    pub entries_per_second: f64,
}
