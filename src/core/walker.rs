//! Concurrent traversal engine.
//!
//! Every path becomes a task. A task probes its path (unless the parent's
//! listing already did), lists it when it is a directory, runs the visitor,
//! and on [`Signal::Continue`] spawns one task per child. Blocking work and
//! the visitor run on tokio's blocking pool, gated by a semaphore.
//!
//! There is no ordering between siblings or across subtrees. The only
//! guarantee is that a directory's visit happens before any of its children
//! is dispatched. Visitors run concurrently and must synchronize any state
//! they share.
//!
//! Cancellation is cooperative: an abort is latched, tasks that have not
//! started yet see the latch and bail out, but tasks already running finish
//! and may still call the visitor.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::settings::WalkSettings;
use crate::error::{EntryError, WalkError};
use crate::models::entry::{Entry, EntryMeta, Signal};

use super::latch::CancelLatch;
use super::lister::{Child, DirLister};
use super::prober::EntryProber;
use super::wait_group::{WaitGroup, WaitToken};

/// Called once per visited path, possibly from many threads at once.
pub trait Visitor: Send + Sync + 'static {
    fn visit(&self, entry: &Entry) -> Signal;
}

impl<F> Visitor for F
where
    F: Fn(&Entry) -> Signal + Send + Sync + 'static,
{
    fn visit(&self, entry: &Entry) -> Signal {
        self(entry)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Walker {
    settings: WalkSettings,
    prober: EntryProber,
    lister: DirLister,
}

impl Walker {
    pub fn new(settings: WalkSettings) -> Self {
        Self {
            settings,
            prober: EntryProber::default(),
            lister: DirLister::default(),
        }
    }

    pub fn with_prober(mut self, prober: EntryProber) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_lister(mut self, lister: DirLister) -> Self {
        self.lister = lister;
        self
    }

    pub fn settings(&self) -> &WalkSettings {
        &self.settings
    }

    /// Visit `root` and everything beneath it, waiting until every task is done.
    ///
    /// Returns the first error latched by an aborting visitor. A few visits
    /// may still happen after that abort; they never replace the error.
    pub async fn walk<P, V>(&self, root: P, visitor: V) -> Result<(), WalkError>
    where
        P: Into<PathBuf>,
        V: Visitor,
    {
        let root = root.into();
        let permits = self.settings.permits();
        tracing::debug!(root = %root.display(), permits, "walk started");

        let ctx = Arc::new(WalkContext {
            visitor,
            prober: self.prober.clone(),
            lister: self.lister.clone(),
            latch: CancelLatch::new(),
            semaphore: Arc::new(Semaphore::new(permits)),
            max_depth: self.settings.max_depth,
        });

        let (group, token) = WaitGroup::new();
        dispatch(Arc::clone(&ctx), Task::root(root), token);
        group.wait().await;

        match ctx.latch.take() {
            Some(err) => {
                tracing::debug!(error = %err, "walk finished with error");
                Err(err)
            }
            None => {
                tracing::debug!("walk finished");
                Ok(())
            }
        }
    }
}

/// Walk `root` with default settings and the platform's no-follow stat.
pub async fn walk<P, V>(root: P, visitor: V) -> Result<(), WalkError>
where
    P: Into<PathBuf>,
    V: Visitor,
{
    Walker::default().walk(root, visitor).await
}

struct Task {
    path: PathBuf,
    depth: usize,
    /// Set when the parent's listing already probed this path.
    meta: Option<Result<EntryMeta, EntryError>>,
}

impl Task {
    fn root(path: PathBuf) -> Self {
        Self {
            path,
            depth: 0,
            meta: None,
        }
    }

    fn child(child: Child, depth: usize) -> Self {
        Self {
            path: child.path,
            depth,
            meta: Some(child.meta),
        }
    }
}

struct WalkContext<V> {
    visitor: V,
    prober: EntryProber,
    lister: DirLister,
    latch: CancelLatch,
    semaphore: Arc<Semaphore>,
    max_depth: Option<usize>,
}

fn dispatch<V: Visitor>(ctx: Arc<WalkContext<V>>, task: Task, token: WaitToken) {
    tokio::spawn(async move {
        let Ok(permit) = Arc::clone(&ctx.semaphore).acquire_owned().await else {
            return;
        };
        if ctx.latch.is_set() {
            tracing::trace!(path = %task.path.display(), "cancelled before start");
            return;
        }

        let path = task.path.clone();
        let worker = Arc::clone(&ctx);
        let outcome = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            worker.run(task)
        })
        .await;

        let children = match outcome {
            Ok(children) => children,
            Err(e) if e.is_panic() => {
                tracing::error!(path = %path.display(), "visitor panicked");
                ctx.latch.try_set(WalkError::Panicked { path });
                return;
            }
            // Runtime is shutting down
            Err(_) => return,
        };

        for child in children {
            tracing::trace!(path = %child.path.display(), depth = child.depth, "dispatch");
            dispatch(Arc::clone(&ctx), child, token.clone());
        }
    });
}

impl<V: Visitor> WalkContext<V> {
    /// Process one path on the blocking pool; returns the tasks to dispatch next.
    fn run(&self, task: Task) -> Vec<Task> {
        let Task { path, depth, meta } = task;

        let meta = match meta.unwrap_or_else(|| self.prober.probe(&path)) {
            Ok(meta) => meta,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "probe failed");
                self.settle(&Entry {
                    path,
                    depth,
                    meta: None,
                    has_subdirectories: false,
                    error: Some(err),
                });
                return Vec::new();
            }
        };

        if !meta.is_dir() {
            self.settle(&Entry {
                path,
                depth,
                meta: Some(meta),
                has_subdirectories: false,
                error: None,
            });
            return Vec::new();
        }

        let children = match self.lister.list(&path, &self.prober) {
            Ok(children) => children,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "listing failed");
                self.settle(&Entry {
                    path,
                    depth,
                    meta: Some(meta),
                    has_subdirectories: false,
                    error: Some(err),
                });
                return Vec::new();
            }
        };

        let entry = Entry {
            path,
            depth,
            meta: Some(meta),
            has_subdirectories: children.iter().any(Child::is_dir),
            error: None,
        };
        if !self.settle(&entry) {
            return Vec::new();
        }
        if self.max_depth.is_some_and(|max| depth >= max) {
            return Vec::new();
        }

        children
            .into_iter()
            .map(|child| Task::child(child, depth + 1))
            .collect()
    }

    /// Run the visitor; true when the entry's children may be dispatched.
    fn settle(&self, entry: &Entry) -> bool {
        match self.visitor.visit(entry) {
            Signal::Continue => true,
            Signal::SkipSubtree => {
                tracing::trace!(path = %entry.path.display(), "subtree skipped");
                false
            }
            Signal::Abort(error) => {
                let err = WalkError::Aborted {
                    path: entry.path.clone(),
                    error,
                };
                if self.latch.try_set(err) {
                    tracing::warn!(path = %entry.path.display(), "walk aborted");
                } else {
                    tracing::debug!(path = %entry.path.display(), "abort after an earlier error, dropped");
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// In-memory tree: every path ending in `/d<n>` is a directory with two
    /// files and, above `depth`, one more directory.
    fn synthetic_walker(depth: usize) -> Walker {
        let lister = DirLister::new(move |dir: &Path| {
            let level = dir.components().count() - 1;
            let mut names: Vec<OsString> = vec!["f1".into(), "f2".into()];
            if level < depth {
                names.push(format!("d{}", level + 1).into());
            }
            Ok(names)
        });
        let prober = EntryProber::new(|path: &Path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with('d') || path == Path::new("/") {
                Ok(EntryMeta::directory())
            } else {
                Ok(EntryMeta::file(10))
            }
        });
        Walker::new(WalkSettings::default().with_concurrency(4))
            .with_lister(lister)
            .with_prober(prober)
    }

    #[tokio::test]
    async fn visits_synthetic_tree_once_per_path() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        synthetic_walker(3)
            .walk("/", move |e: &Entry| {
                sink.lock().unwrap().push(e.path.clone());
                Signal::Continue
            })
            .await
            .unwrap();

        let mut seen = seen.lock().unwrap().clone();
        // root + 3 nested dirs + 2 files in each of the 4 dirs
        assert_eq!(seen.len(), 12);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 12);
    }

    #[tokio::test]
    async fn max_depth_stops_descent_but_visits_the_boundary() {
        let walker = synthetic_walker(5);
        let walker = Walker::new(walker.settings().clone().with_max_depth(Some(1)))
            .with_lister(walker.lister.clone())
            .with_prober(walker.prober.clone());

        let deepest = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&deepest);
        walker
            .walk("/", move |e: &Entry| {
                sink.fetch_max(e.depth, Ordering::SeqCst);
                Signal::Continue
            })
            .await
            .unwrap();

        assert_eq!(deepest.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn has_subdirectories_reflects_children() {
        let flags = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&flags);

        synthetic_walker(1)
            .walk("/", move |e: &Entry| {
                if e.is_dir() {
                    sink.lock().unwrap().push((e.depth, e.has_subdirectories));
                }
                Signal::Continue
            })
            .await
            .unwrap();

        let mut flags = flags.lock().unwrap().clone();
        flags.sort();
        assert_eq!(flags, vec![(0, true), (1, false)]);
    }

    #[tokio::test]
    async fn panicking_visitor_is_latched() {
        let err = synthetic_walker(1)
            .walk("/", |e: &Entry| {
                if e.path == Path::new("/d1") {
                    panic!("visitor bug");
                }
                Signal::Continue
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WalkError::Panicked { .. }));
        assert_eq!(err.path(), Path::new("/d1"));
    }

    #[tokio::test]
    async fn root_probe_failure_is_reported_to_visitor() {
        let walker = Walker::default()
            .with_prober(EntryProber::new(|_| Err(io::Error::from(io::ErrorKind::NotFound))));

        let calls = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&calls);
        walker
            .walk("/missing", move |e: &Entry| {
                assert!(e.meta.is_none());
                assert!(matches!(e.error, Some(EntryError::Probe { .. })));
                sink.fetch_add(1, Ordering::SeqCst);
                Signal::Continue
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
