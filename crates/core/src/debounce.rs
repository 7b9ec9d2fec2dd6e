//! Trailing-edge debouncing for search input.
//!
//! A value is let through only once the input has been quiet for the whole
//! interval. Every new value restarts the timer; nothing is emitted on the
//! leading edge and there is no cap on the total delay.
//!
//! - [`debounced`] adapts a channel of raw input into a channel of settled values.
//! - [`DebounceGate`] suits callback-driven UIs where each keystroke spawns
//!   its own delayed task and only the newest one may proceed.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

/// Quiet period used for search input.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Spawn a task that forwards the last value of every burst from `input`.
///
/// When `input` closes while a value is pending, that value is flushed before
/// the returned receiver closes.
pub fn debounced<T: Send + 'static>(
    mut input: mpsc::Receiver<T>,
    interval: Duration,
) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        while let Some(mut pending) = input.recv().await {
            loop {
                tokio::select! {
                    next = input.recv() => match next {
                        Some(value) => pending = value,
                        None => {
                            let _ = tx.send(pending).await;
                            return;
                        }
                    },
                    _ = tokio::time::sleep(interval) => break,
                }
            }
            if tx.send(pending).await.is_err() {
                return;
            }
        }
    });

    rx
}

/// Generation counter: each [`settle`](DebounceGate::settle) call supersedes
/// all earlier ones still waiting, in call order.
#[derive(Clone, Debug)]
pub struct DebounceGate {
    interval: Duration,
    generation: Arc<AtomicU64>,
}

impl DebounceGate {
    pub fn new(interval: Duration) -> Self {
        Self { interval, generation: Arc::new(AtomicU64::new(0)) }
    }

    /// Claim the newest generation now, then wait out the interval. The
    /// future resolves to `true` only if no later `settle` call was made in
    /// the meantime, whatever order the futures are polled in.
    pub fn settle(&self) -> impl Future<Output = bool> + Send + 'static {
        let gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let interval = self.interval;
        async move {
            tokio::time::sleep(interval).await;
            generation.load(Ordering::SeqCst) == gen
        }
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
