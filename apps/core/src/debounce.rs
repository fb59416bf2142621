//! Debounced background persistence for free-text fields (notes).
//!
//! Every `set` resets the quiet-period timer; the pending value is sent
//! through the save callback only once typing pauses. `flush` sends
//! immediately, and dropping the writer flushes whatever is pending, so
//! navigating away never loses the last keystrokes.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

enum Command {
    Set(String),
    Flush,
}

pub struct DebouncedWriter {
    tx: mpsc::UnboundedSender<Command>,
}

impl DebouncedWriter {
    pub fn spawn<F, Fut>(quiet: Duration, save: F) -> Self
    where
        F: Fn(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(quiet, save, rx));
        Self { tx }
    }

    /// Records the latest value and restarts the quiet-period timer.
    pub fn set(&self, value: impl Into<String>) {
        // A closed worker means the runtime is shutting down; the value has
        // nowhere to go either way.
        let _ = self.tx.send(Command::Set(value.into()));
    }

    /// Sends the pending value now instead of waiting out the timer.
    pub fn flush(&self) {
        let _ = self.tx.send(Command::Flush);
    }
}

async fn run<F, Fut>(quiet: Duration, save: F, mut rx: mpsc::UnboundedReceiver<Command>)
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut pending: Option<String> = None;
    loop {
        if pending.is_some() {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(Command::Set(value)) => pending = Some(value),
                    Some(Command::Flush) => {
                        if let Some(value) = pending.take() {
                            save(value).await;
                        }
                    }
                    // Writer dropped: flush the tail rather than drop it.
                    None => {
                        if let Some(value) = pending.take() {
                            debug!("Flushing pending value on writer drop");
                            save(value).await;
                        }
                        return;
                    }
                },
                _ = tokio::time::sleep(quiet) => {
                    if let Some(value) = pending.take() {
                        save(value).await;
                    }
                }
            }
        } else {
            match rx.recv().await {
                Some(Command::Set(value)) => pending = Some(value),
                Some(Command::Flush) => {}
                None => return,
            }
        }
    }
}
