use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Trailing-edge debouncer: every pushed value restarts the window, and only the last
/// value seen when the window elapses is handed to the callback.
///
/// Dropping the debouncer (or calling [`Debouncer::cancel`]) discards anything pending.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(window: Duration, on_fire: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        let task = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => latest = value,
                            None => return,
                        },
                        _ = tokio::time::sleep(window) => break,
                    }
                }
                on_fire(latest);
            }
        });

        Self { tx, task }
    }

    pub fn push(&self, value: T) {
        if self.tx.send(value).is_err() {
            debug!("debouncer already stopped, dropping event");
        }
    }

    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
