use std::sync::Arc;
use tokio::sync::watch;

/// Owner side of the cancellation token shared by the background loops.
///
/// Flips from running to stopped exactly once. Dropping every `Shutdown`
/// clone is observed by the signals as a shutdown as well.
#[derive(Clone, Debug)]
pub(crate) struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Shutdown { tx: Arc::new(tx) }
    }

    /// Trigger the shutdown, returns false when it was already triggered.
    pub(crate) fn trigger(&self) -> bool {
        self.tx.send_if_modified(|stopped| {
            if *stopped {
                false
            } else {
                *stopped = true;
                true
            }
        })
    }

    pub(crate) fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Loop side of the cancellation token.
#[derive(Clone, Debug)]
pub(crate) struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub(crate) fn is_triggered(&self) -> bool {
        let stopped = *self.rx.borrow();
        stopped || self.rx.has_changed().is_err()
    }

    /// Resolves once shutdown is triggered or the owner is gone.
    pub(crate) async fn recv(&mut self) {
        loop {
            let stopped = *self.rx.borrow_and_update();
            if stopped {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}
