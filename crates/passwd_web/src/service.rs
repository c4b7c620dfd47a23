use crate::generator::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::store::CounterStore;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Counter increments between periodic persistence flushes.
pub const FLUSH_EVERY: u64 = 100;

/// The shared core of the service: the served-password counter and the
/// consuming end of the password queue.
///
/// Constructed once at startup and handed to every request handler and
/// background service.
pub struct PasswordService {
    counter: Mutex<u64>,
    passwords: tokio::sync::Mutex<mpsc::Receiver<String>>,
    store: Arc<CounterStore>,
}

impl PasswordService {
    pub fn new(
        passwords: mpsc::Receiver<String>,
        store: Arc<CounterStore>,
        initial: u64,
    ) -> Arc<Self> {
        Arc::new(Self {
            counter: Mutex::new(initial),
            passwords: tokio::sync::Mutex::new(passwords),
            store,
        })
    }

    /// Passwords served over the counter's (persisted) lifetime.
    pub fn counter(&self) -> u64 {
        *self.counter.lock().expect("counter lock poisoned")
    }

    /// Serve one password truncated to `requested` characters, clamped to
    /// [`MIN_PASSWORD_LENGTH`, `MAX_PASSWORD_LENGTH`].
    ///
    /// Increments the counter by exactly one; every [`FLUSH_EVERY`]th
    /// increment spawns an independent flush of the value it observed.
    /// Returns `None` only once the generator has stopped during shutdown
    /// and the queue has drained.
    pub async fn next_password(&self, requested: usize) -> Option<String> {
        let count = {
            let mut counter = self.counter.lock().expect("counter lock poisoned");
            *counter += 1;
            *counter
        };

        if self.store.is_enabled() && count % FLUSH_EVERY == 0 {
            // Dispatched off the request path, after the counter lock is
            // released; the store's own lock serializes overlapping flushes.
            let store = Arc::clone(&self.store);
            tokio::spawn(async move { store.flush(count).await });
        }

        let mut password = self.passwords.lock().await.recv().await?;
        password.truncate(requested.clamp(MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH));
        Some(password)
    }

    /// Persist the current counter value unconditionally. Used on shutdown
    /// and wherever a deterministic flush is needed.
    pub async fn flush_now(&self) {
        self.store.flush(self.counter()).await;
    }
}
