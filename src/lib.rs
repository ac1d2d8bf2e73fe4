//! Concurrent directory-tree traversal.
//!
//! [`walk`] visits every path under a root exactly once, calling a
//! [`Visitor`] per entry from many tasks at once. The visitor steers the
//! walk with a [`Signal`]: continue, skip a directory's subtree, or abort.
//! The first abort wins and becomes the walk's return value.
//!
//! ```no_run
//! use parwalk::{walk, Entry, Signal};
//!
//! # async fn run() -> Result<(), parwalk::WalkError> {
//! walk("/var/log", |entry: &Entry| {
//!     println!("{}", entry.path.display());
//!     Signal::Continue
//! })
//! .await
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod models;

pub use crate::config::settings::WalkSettings;
pub use crate::core::collector::Collector;
pub use crate::core::latch::CancelLatch;
pub use crate::core::lister::{Child, DirLister, ReadDirFn};
pub use crate::core::prober::{EntryProber, StatFn};
pub use crate::core::walker::{walk, Visitor, Walker};
pub use crate::error::{EntryError, WalkError};
pub use crate::models::entry::{Entry, EntryKind, EntryMeta, Signal};
pub use crate::models::report::{IssueKind, WalkIssue, WalkReport};
