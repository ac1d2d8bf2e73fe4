use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::EntryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

/// Metadata of a path as reported without following symlinks.
///
/// A plain value rather than `std::fs::Metadata` so that injected stat
/// functions can fabricate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    pub kind: EntryKind,
    pub len: u64,
    pub mode: u32,
    pub modified: Option<SystemTime>,
}

impl EntryMeta {
    pub fn file(len: u64) -> Self {
        Self {
            kind: EntryKind::File,
            len,
            mode: 0o644,
            modified: None,
        }
    }

    pub fn directory() -> Self {
        Self {
            kind: EntryKind::Directory,
            len: 0,
            mode: 0o755,
            modified: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

impl From<&Metadata> for EntryMeta {
    fn from(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        #[cfg(unix)]
        let mode = std::os::unix::fs::MetadataExt::mode(metadata);
        #[cfg(not(unix))]
        let mode = if metadata.permissions().readonly() { 0o444 } else { 0o644 };

        Self {
            kind,
            len: metadata.len(),
            mode,
            modified: metadata.modified().ok(),
        }
    }
}

/// What the walker hands to the visitor for one path.
///
/// Built right before the visitor runs and dropped right after it returns.
#[derive(Debug)]
pub struct Entry {
    pub path: PathBuf,
    /// Distance from the walk root; the root itself is 0.
    pub depth: usize,
    /// `None` only when probing the path failed.
    pub meta: Option<EntryMeta>,
    /// True for directories with at least one subdirectory.
    pub has_subdirectories: bool,
    pub error: Option<EntryError>,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.meta.is_some_and(|m| m.is_dir())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Visitor verdict for an entry.
#[derive(Debug)]
pub enum Signal {
    Continue,
    /// Don't descend into this directory. A no-op for anything else.
    SkipSubtree,
    /// Stop dispatching new work and make the walk return this error,
    /// unless another task aborted first.
    Abort(anyhow::Error),
}

impl Signal {
    pub fn abort<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Abort(error.into())
    }
}
