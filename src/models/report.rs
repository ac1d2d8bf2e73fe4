use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::settings::WalkSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkReport {
    pub root: PathBuf,
    pub total_files: usize,
    pub total_dirs: usize,
    pub total_other: usize,
    pub total_size: u64,
    pub issues: Vec<WalkIssue>,
    /// Message of the error the walk stopped on, if any.
    pub aborted: Option<String>,
    pub duration: Duration,
    pub started_at: DateTime<Utc>,
    pub settings: WalkSettings,
}

impl WalkReport {
    pub fn total_entries(&self) -> usize {
        self.total_files + self.total_dirs + self.total_other
    }

    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkIssue {
    pub path: PathBuf,
    pub kind: IssueKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    PermissionDenied,
    NotFound,
    Io,
}

impl From<io::ErrorKind> for IssueKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::PermissionDenied => IssueKind::PermissionDenied,
            io::ErrorKind::NotFound => IssueKind::NotFound,
            _ => IssueKind::Io,
        }
    }
}
