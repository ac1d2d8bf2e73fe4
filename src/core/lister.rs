use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::EntryError;
use crate::models::entry::EntryMeta;

use super::prober::EntryProber;

/// Returns the names of a directory's immediate children, in no particular order.
pub type ReadDirFn = Arc<dyn Fn(&Path) -> io::Result<Vec<OsString>> + Send + Sync>;

/// One listed child with its own probe outcome.
#[derive(Debug)]
pub struct Child {
    pub path: PathBuf,
    pub meta: Result<EntryMeta, EntryError>,
}

impl Child {
    pub fn is_dir(&self) -> bool {
        self.meta.as_ref().is_ok_and(|m| m.is_dir())
    }
}

#[derive(Clone)]
pub struct DirLister {
    read_dir: ReadDirFn,
}

impl DirLister {
    pub fn new<F>(read_dir: F) -> Self
    where
        F: Fn(&Path) -> io::Result<Vec<OsString>> + Send + Sync + 'static,
    {
        Self {
            read_dir: Arc::new(read_dir),
        }
    }

    pub fn read_names(dir: &Path) -> io::Result<Vec<OsString>> {
        std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect()
    }

    /// List `dir` and probe every child.
    ///
    /// The outer error means the directory itself could not be read. A child
    /// that fails to probe is still returned, carrying its own error.
    /// Children are left unsorted.
    pub fn list(&self, dir: &Path, prober: &EntryProber) -> Result<Vec<Child>, EntryError> {
        let names = (self.read_dir)(dir).map_err(|e| EntryError::read_dir(dir, e))?;

        Ok(names
            .into_iter()
            .map(|name| {
                let path = dir.join(name);
                let meta = prober.probe(&path);
                Child { path, meta }
            })
            .collect())
    }
}

impl Default for DirLister {
    fn default() -> Self {
        Self::new(Self::read_names)
    }
}

impl fmt::Debug for DirLister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirLister").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("parwalk_lister_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create test dir");
        dir
    }

    #[test]
    fn lists_children_with_metadata() {
        let dir = make_test_dir("basic");
        std::fs::write(dir.join("a.txt"), "hello").unwrap();
        std::fs::create_dir(dir.join("sub")).unwrap();

        let children = DirLister::default()
            .list(&dir, &EntryProber::default())
            .unwrap();
        assert_eq!(children.len(), 2);

        let sub = children.iter().find(|c| c.path.ends_with("sub")).unwrap();
        assert!(sub.is_dir());
        let file = children.iter().find(|c| c.path.ends_with("a.txt")).unwrap();
        assert_eq!(file.meta.as_ref().unwrap().len, 5);
        assert!(file.meta.as_ref().unwrap().is_file());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unreadable_directory_is_one_error() {
        let lister = DirLister::new(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied)));
        let err = lister
            .list(Path::new("/locked"), &EntryProber::default())
            .unwrap_err();
        assert!(matches!(err, EntryError::ReadDir { .. }));
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn child_probe_failure_stays_on_the_child() {
        let lister = DirLister::new(|_| Ok(vec!["ok".into(), "bad".into()]));
        let prober = EntryProber::new(|p| {
            if p.ends_with("bad") {
                Err(io::Error::other("nope"))
            } else {
                Ok(EntryMeta::directory())
            }
        });

        let children = lister.list(Path::new("/root"), &prober).unwrap();
        assert_eq!(children.len(), 2);
        assert!(children[0].is_dir());
        assert!(children[1].meta.is_err());
        assert!(!children[1].is_dir());
    }
}
