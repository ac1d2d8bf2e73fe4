use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::error::EntryError;
use crate::models::entry::EntryMeta;

/// A no-follow stat: metadata of the path itself, never of a symlink target.
pub type StatFn = Arc<dyn Fn(&Path) -> io::Result<EntryMeta> + Send + Sync>;

/// Obtains entry metadata through a replaceable stat function.
#[derive(Clone)]
pub struct EntryProber {
    stat: StatFn,
}

impl EntryProber {
    pub fn new<F>(stat: F) -> Self
    where
        F: Fn(&Path) -> io::Result<EntryMeta> + Send + Sync + 'static,
    {
        Self {
            stat: Arc::new(stat),
        }
    }

    pub fn lstat(path: &Path) -> io::Result<EntryMeta> {
        std::fs::symlink_metadata(path).map(|m| EntryMeta::from(&m))
    }

    pub fn probe(&self, path: &Path) -> Result<EntryMeta, EntryError> {
        (self.stat)(path).map_err(|e| EntryError::probe(path, e))
    }
}

impl Default for EntryProber {
    fn default() -> Self {
        Self::new(Self::lstat)
    }
}

impl fmt::Debug for EntryProber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryProber").finish_non_exhaustive()
    }
}
