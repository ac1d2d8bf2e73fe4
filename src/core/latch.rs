use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::WalkError;

/// Holds at most one error per walk. The first writer wins.
#[derive(Debug, Default)]
pub struct CancelLatch {
    tripped: AtomicBool,
    slot: Mutex<Option<WalkError>>,
}

impl CancelLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `err` unless an error is already latched. Returns whether this call won.
    pub fn try_set(&self, err: WalkError) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        // `tripped` only changes under the lock, so it still counts after `take`
        if self.tripped.load(Ordering::Relaxed) {
            return false;
        }
        *slot = Some(err);
        self.tripped.store(true, Ordering::Release);
        true
    }

    /// Advisory peek: a relaxed hint used to avoid dispatching new work.
    /// May lag behind `try_set`; the error itself is only read by `take`.
    pub fn is_set(&self) -> bool {
        self.tripped.load(Ordering::Relaxed)
    }

    /// Remove the latched error. Later `try_set` calls still lose.
    pub fn take(&self) -> Option<WalkError> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;

    fn aborted(name: &str) -> WalkError {
        WalkError::Aborted {
            path: PathBuf::from(name),
            error: anyhow::anyhow!("{name}"),
        }
    }

    #[test]
    fn first_writer_wins() {
        let latch = CancelLatch::new();
        assert!(!latch.is_set());
        assert!(latch.try_set(aborted("first")));
        assert!(!latch.try_set(aborted("second")));
        assert!(latch.is_set());

        let err = latch.take().unwrap();
        assert_eq!(err.path(), PathBuf::from("first"));
        assert!(latch.take().is_none());
        assert!(latch.is_set());
        assert!(!latch.try_set(aborted("third")));
        assert!(latch.take().is_none());
    }

    #[test]
    fn exactly_one_thread_wins_the_race() {
        let latch = Arc::new(CancelLatch::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let latch = Arc::clone(&latch);
                std::thread::spawn(move || latch.try_set(aborted(&format!("t{i}"))))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(latch.take().is_some());
    }
}
