use tokio::sync::mpsc;

/// Counting join over a set of tasks that can spawn more tasks.
///
/// Each task holds a [`WaitToken`] and hands clones to whatever it spawns.
/// [`WaitGroup::wait`] resolves once every token is gone.
#[derive(Debug)]
pub struct WaitGroup {
    rx: mpsc::Receiver<()>,
}

/// Keeps the [`WaitGroup`] open while alive. Never sends.
#[derive(Debug, Clone)]
pub struct WaitToken {
    _tx: mpsc::Sender<()>,
}

impl WaitGroup {
    pub fn new() -> (Self, WaitToken) {
        let (tx, rx) = mpsc::channel(1);
        (Self { rx }, WaitToken { _tx: tx })
    }

    pub async fn wait(mut self) {
        // recv yields None once all senders have dropped
        while self.rx.recv().await.is_some() {}
    }
}
