use crate::service::PasswordService;
use async_trait::async_trait;
use pingora::server::ShutdownWatch;
use pingora::services::background::BackgroundService;
use std::sync::Arc;

/// Writes the counter out one final time when the server begins shutting
/// down, regardless of where the periodic flush cycle stands.
///
/// Signal handling itself belongs to the pingora server: it flips the
/// shutdown watch on SIGTERM/SIGINT, waits for background services to
/// finish, then exits the process.
pub struct FlushOnShutdown {
    service: Arc<PasswordService>,
}

impl FlushOnShutdown {
    pub fn new(service: Arc<PasswordService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl BackgroundService for FlushOnShutdown {
    async fn start(&self, mut shutdown: ShutdownWatch) {
        // Suspends for the life of the process; the watch flips exactly
        // once. Flush even if the sender side vanished first.
        let _ = shutdown.changed().await;

        let counter = self.service.counter();
        self.service.flush_now().await;
        tracing::info!(counter, "final counter flush complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::password_queue;
    use crate::store::CounterStore;
    use tokio::sync::watch;
    use tokio::time::{Duration, timeout};

    #[tokio::test]
    async fn shutdown_flushes_unpersisted_counter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("counter");
        let (store, _) = CounterStore::open(Some(&path)).expect("open");

        // 57 is off the periodic flush cycle; only the shutdown path
        // writes it.
        let (_tx, rx) = password_queue();
        let service = PasswordService::new(rx, Arc::new(store), 57);

        let flusher = FlushOnShutdown::new(Arc::clone(&service));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move { flusher.start(shutdown_rx).await });

        shutdown_tx.send(true).expect("signal shutdown");
        timeout(Duration::from_secs(1), task)
            .await
            .expect("flusher should finish")
            .expect("flusher should not panic");

        assert_eq!(
            std::fs::read_to_string(&path).expect("read counter file"),
            "57"
        );
    }

    #[tokio::test]
    async fn dropped_watch_still_flushes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("counter");
        let (store, _) = CounterStore::open(Some(&path)).expect("open");

        let (_tx, rx) = password_queue();
        let service = PasswordService::new(rx, Arc::new(store), 3);

        let flusher = FlushOnShutdown::new(service);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move { flusher.start(shutdown_rx).await });

        drop(shutdown_tx);
        timeout(Duration::from_secs(1), task)
            .await
            .expect("flusher should finish")
            .expect("flusher should not panic");

        assert_eq!(
            std::fs::read_to_string(&path).expect("read counter file"),
            "3"
        );
    }
}
