//! Advisory write lock for the persisted sheets.
//!
//! Mutations (create/update/delete, identifier repair, payee writes, imports)
//! acquire the lock before touching a sheet. Acquisition waits up to the
//! configured timeout; if the lock is still busy the caller proceeds anyway
//! with a warning, so the lock narrows races without ever blocking a write
//! forever. Reads never take it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

/// How long a writer waits for the lock before proceeding unlocked
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct WriteLock {
    inner: Arc<Mutex<()>>,
    timeout: Duration,
}

/// Held for the duration of one mutation; releases on drop
pub struct WriteGuard {
    guard: Option<OwnedMutexGuard<()>>,
}

impl WriteGuard {
    /// False when acquisition timed out and the write is running unlocked
    pub fn is_held(&self) -> bool {
        self.guard.is_some()
    }
}

impl WriteLock {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(())),
            timeout,
        }
    }

    pub async fn acquire(&self, operation: &str) -> WriteGuard {
        match tokio::time::timeout(self.timeout, self.inner.clone().lock_owned()).await {
            Ok(guard) => {
                debug!("Write lock acquired for {}", operation);
                WriteGuard { guard: Some(guard) }
            }
            Err(_) => {
                warn!(
                    "Write lock busy for {:?}, proceeding with {} unlocked",
                    self.timeout, operation
                );
                WriteGuard { guard: None }
            }
        }
    }
}

impl Default for WriteLock {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}
