// ABOUTME: Cooperative cancellation between orchestration phases.
// ABOUTME: A watch channel carries a single "stop after this phase" flag.

use tokio::sync::watch;

/// Requests cancellation of an in-flight dispatch.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Observes cancellation requests. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelHandle {
    pub fn new() -> (Self, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelSignal { rx })
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested; pends forever if the handle is dropped.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
