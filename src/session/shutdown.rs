//! Shutdown signal shared between the session and its controllers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Write-once shutdown flag with wakeup
///
/// Cheap to clone; every clone refers to the same flag. Safe to raise from
/// any thread or task.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown
    ///
    /// Returns `true` for the call that actually raised the flag; later calls
    /// are no-ops and return `false`.
    pub fn request_shutdown(&self) -> bool {
        if self.inner.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.inner.notify.notify_one();
        true
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&self) {
        while !self.is_requested() {
            self.inner.notify.notified().await;
        }
    }
}
