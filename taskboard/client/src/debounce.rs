use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delays search terms until typing has been quiet for a fixed interval.
///
/// Every call to [`SearchDebouncer::input`] cancels the pending timer and
/// starts a new one; only the last term of a burst reaches the receiver.
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    sender: mpsc::UnboundedSender<String>,
    pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

    /// Creates a debouncer and the receiver on which settled terms arrive.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            sender,
            pending: None,
        };
        (debouncer, receiver)
    }

    /// Records a keystroke's worth of search input.
    pub fn input(&mut self, term: impl Into<String>) {
        self.cancel();
        let term = term.into();
        let sender = self.sender.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means nobody is listening any more.
            let _ = sender.send(term);
        }));
    }

    /// Drops the pending term, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
