use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Failure attached to a single visited entry.
///
/// Entry errors never stop a walk on their own; they are handed to the
/// visitor, which decides whether to continue or abort. The io error sits
/// behind an `Arc` so a visitor can clone it into [`crate::Signal::Abort`].
#[derive(Debug, Clone, Error)]
pub enum EntryError {
    #[error("stat {}: {source}", .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("read dir {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
}

impl EntryError {
    pub fn probe(path: &Path, source: io::Error) -> Self {
        Self::Probe {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    pub fn read_dir(path: &Path, source: io::Error) -> Self {
        Self::ReadDir {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Probe { path, .. } | Self::ReadDir { path, .. } => path,
        }
    }

    pub fn io_error(&self) -> &io::Error {
        match self {
            Self::Probe { source, .. } | Self::ReadDir { source, .. } => source,
        }
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.io_error().kind()
    }
}

/// The single error a walk returns: whichever was latched first.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The visitor returned [`crate::Signal::Abort`] for `path`.
    #[error("walk aborted at {}: {error}", .path.display())]
    Aborted {
        path: PathBuf,
        #[source]
        error: anyhow::Error,
    },

    /// The visitor panicked while handling `path`.
    #[error("visitor panicked at {}", .path.display())]
    Panicked { path: PathBuf },
}

impl WalkError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Aborted { path, .. } | Self::Panicked { path } => path,
        }
    }

    /// The error the visitor aborted with, if this was an abort.
    pub fn abort_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Aborted { error, .. } => Some(error),
            Self::Panicked { .. } => None,
        }
    }
}
