//! Trailing-edge debouncer.
//!
//! Values are pushed into an unbounded channel and collected by a worker
//! task. Only the latest value is kept; it is handed to the handler once the
//! delay has elapsed with no newer value arriving. Each push restarts the
//! timer, so there is never more than one pending timer.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct Debouncer<T> {
    tx: Mutex<Option<mpsc::UnboundedSender<T>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Start the worker. Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(delay: Duration, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(debounce_worker(rx, delay, handler));

        Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Submit a value, superseding any value still waiting for its timer.
    ///
    /// Returns `false` once the debouncer has been closed.
    pub fn push(&self, value: T) -> bool {
        match lock(&self.tx).as_ref() {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    /// Stop accepting values and wait for the worker to finish.
    ///
    /// A value still waiting for its timer is handled right away.
    pub async fn close(&self) {
        lock(&self.tx).take();
        let worker = lock(&self.worker).take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::warn!("Debounce worker ended abnormally: {}", e);
            }
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(worker) = lock(&self.worker).take() {
            worker.abort();
        }
    }
}

fn lock<G>(mutex: &Mutex<G>) -> MutexGuard<'_, G> {
    mutex.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("Debouncer mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

async fn debounce_worker<T, F, Fut>(mut rx: mpsc::UnboundedReceiver<T>, delay: Duration, handler: F)
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut pending: Option<T> = None;

    loop {
        if pending.is_none() {
            match rx.recv().await {
                Some(value) => {
                    pending = Some(value);
                    continue;
                }
                None => return,
            }
        }

        tokio::select! {
            next = rx.recv() => match next {
                Some(value) => {
                    tracing::debug!("Debounced value superseded");
                    pending = Some(value);
                }
                None => {
                    if let Some(value) = pending.take() {
                        handler(value).await;
                    }
                    return;
                }
            },
            _ = tokio::time::sleep(delay) => {
                if let Some(value) = pending.take() {
                    handler(value).await;
                }
            }
        }
    }
}
