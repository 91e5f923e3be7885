//! Shutdown coordination for the monitor.
//!
//! `Shutdown` is held by whoever owns the process lifecycle; each background
//! task gets a `ShutdownListener`. A listener created or polled after the
//! signal fired still observes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Coordinator for cooperative shutdown.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Hand out a listener for one background task.
    pub fn listen(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
            triggered: self.triggered.clone(),
        }
    }

    /// Fire the shutdown signal. Returns `false` if it had already fired.
    pub fn trigger(&self) -> bool {
        if self.triggered.swap(true, Ordering::AcqRel) {
            return false;
        }
        let listeners = self.tx.send(()).unwrap_or(0);
        tracing::debug!(listeners, "Shutdown signal sent");
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half held by a background task.
#[derive(Debug)]
pub struct ShutdownListener {
    rx: broadcast::Receiver<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownListener {
    /// Resolve once shutdown has been requested.
    ///
    /// Also resolves if every `Shutdown` handle was dropped.
    pub async fn recv(&mut self) {
        if self.triggered.load(Ordering::Acquire) {
            return;
        }
        let _ = self.rx.recv().await;
    }
}
