use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::config::settings::WalkSettings;
use crate::error::WalkError;
use crate::models::entry::{Entry, Signal};
use crate::models::report::{WalkIssue, WalkReport};

use super::progress::ProgressTracker;
use super::walker::Visitor;

/// Visitor that tallies a walk into a [`WalkReport`].
///
/// Cheap to clone; clones share the same counters and issue map.
#[derive(Debug, Clone)]
pub struct Collector {
    progress: Arc<ProgressTracker>,
    issues: Arc<DashMap<PathBuf, WalkIssue>>,
    skip_names: Arc<HashSet<String>>,
    fail_fast: bool,
}

impl Collector {
    pub fn new<I, S>(skip_names: I, fail_fast: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            progress: Arc::new(ProgressTracker::new()),
            issues: Arc::new(DashMap::new()),
            skip_names: Arc::new(skip_names.into_iter().map(Into::into).collect()),
            fail_fast,
        }
    }

    pub fn progress(&self) -> &Arc<ProgressTracker> {
        &self.progress
    }

    fn skips(&self, entry: &Entry) -> bool {
        entry.depth > 0
            && entry.is_dir()
            && entry
                .file_name()
                .is_some_and(|name| self.skip_names.contains(name))
    }

    pub fn report(
        &self,
        root: PathBuf,
        outcome: &Result<(), WalkError>,
        settings: &WalkSettings,
        started_at: DateTime<Utc>,
    ) -> WalkReport {
        let snapshot = self.progress.snapshot();
        let mut issues: Vec<WalkIssue> = self.issues.iter().map(|kv| kv.value().clone()).collect();
        issues.sort_by(|a, b| a.path.cmp(&b.path));

        WalkReport {
            root,
            total_files: snapshot.files_seen,
            total_dirs: snapshot.dirs_seen,
            total_other: snapshot.other_seen,
            total_size: snapshot.total_size,
            issues,
            aborted: outcome.as_ref().err().map(|e| e.to_string()),
            duration: snapshot.elapsed,
            started_at,
            settings: settings.clone(),
        }
    }
}

impl Visitor for Collector {
    fn visit(&self, entry: &Entry) -> Signal {
        if let Some(meta) = &entry.meta {
            self.progress.record(meta);
        }

        if let Some(err) = &entry.error {
            self.progress.increment_errors();
            self.issues.insert(
                entry.path.clone(),
                WalkIssue {
                    path: entry.path.clone(),
                    kind: err.kind().into(),
                    message: err.to_string(),
                },
            );
            if self.fail_fast {
                return Signal::abort(err.clone());
            }
            return Signal::Continue;
        }

        if self.skips(entry) {
            tracing::debug!(path = %entry.path.display(), "skipping by name");
            return Signal::SkipSubtree;
        }

        Signal::Continue
    }
}
