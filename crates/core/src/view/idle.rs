use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_PHRASES: &[&str] = &[
    "Try AAPL to see where Apple is headed",
    "Curious about NVDA? Search for it above",
    "Pick a popular stock to get started",
    "Type a company name, like Microsoft",
    "Check the latest call on TSLA",
];

/// Fixed list of placeholder phrases cycled while no result is shown.
#[derive(Debug, Clone, Copy)]
pub struct IdlePhrases {
    phrases: &'static [&'static str],
    interval: Duration,
}

impl IdlePhrases {
    pub fn new(phrases: &'static [&'static str], interval: Duration) -> Self {
        Self { phrases, interval }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self::new(DEFAULT_PHRASES, interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn phrase(&self, index: usize) -> &'static str {
        if self.phrases.is_empty() {
            return "";
        }
        self.phrases[index % self.phrases.len()]
    }

    /// Phrase showing after `elapsed` of uninterrupted idling.
    pub fn phrase_at(&self, elapsed: Duration) -> &'static str {
        if self.interval.is_zero() {
            return self.phrase(0);
        }
        let ticks = elapsed.as_millis() / self.interval.as_millis().max(1);
        self.phrase((ticks % self.phrases.len().max(1) as u128) as usize)
    }
}

/// Repeating timer advancing the idle phrase. Aborted on [`IdleTicker::stop`] or drop.
#[derive(Debug)]
pub struct IdleTicker {
    phrases: IdlePhrases,
    index: watch::Receiver<usize>,
    handle: JoinHandle<()>,
}

impl IdleTicker {
    /// Must be called from within a tokio runtime.
    pub fn start(phrases: IdlePhrases) -> Self {
        let (tx, rx) = watch::channel(0usize);
        let period = phrases.interval().max(Duration::from_millis(1));
        let len = phrases.len().max(1);

        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            let mut index = 0usize;
            loop {
                interval.tick().await;
                index = (index + 1) % len;
                if tx.send(index).is_err() {
                    break;
                }
            }
        });

        tracing::trace!(?period, "idle phrase rotation started");
        Self {
            phrases,
            index: rx,
            handle,
        }
    }

    pub fn index(&self) -> usize {
        *self.index.borrow()
    }

    pub fn current(&self) -> &'static str {
        self.phrases.phrase(self.index())
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.index.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {}
}

/// Resolves with the next phrase index published after this call. Never resolves
/// when there is no rotation or the rotation has stopped.
pub async fn next_tick(updates: &mut Option<watch::Receiver<usize>>) -> usize {
    if let Some(rx) = updates.as_mut() {
        rx.borrow_and_update();
        if rx.changed().await.is_ok() {
            return *rx.borrow();
        }
        *updates = None;
    }
    std::future::pending().await
}

impl Drop for IdleTicker {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::trace!("idle phrase rotation stopped");
    }
}
