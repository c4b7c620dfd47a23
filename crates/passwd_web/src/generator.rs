use async_trait::async_trait;
use pingora::server::ShutdownWatch;
use pingora::services::background::BackgroundService;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

/// Password characters, with visually ambiguous ones (`0`/`O`, `1`/`l`/`I`)
/// left out.
pub const ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Shortest password a client can request.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Length of every generated password. Shorter requests are served by
/// truncating a full-length draw, never by drawing again.
pub const MAX_PASSWORD_LENGTH: usize = 30;

/// Ready-to-serve passwords buffered ahead of demand.
pub const QUEUE_DEPTH: usize = 10;

/// Create the bounded queue connecting the generator to request handlers.
pub fn password_queue() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(QUEUE_DEPTH)
}

/// Draw one full-length password, each character independent and uniform
/// over [`ALPHABET`].
fn random_password(rng: &mut SmallRng) -> String {
    (0..MAX_PASSWORD_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Background producer that keeps the password queue full.
///
/// Loops for the life of the process: draw a password, push it onto the
/// queue, suspend while the queue is full. Stops only when the server begins
/// shutting down or every receiver is gone.
pub struct PasswordGenerator {
    tx: mpsc::Sender<String>,
}

impl PasswordGenerator {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl BackgroundService for PasswordGenerator {
    async fn start(&self, mut shutdown: ShutdownWatch) {
        // Seeded once per process so output varies across runs. Uniformity
        // is all that is asked of this source; it is not a CSPRNG.
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let mut rng = SmallRng::seed_from_u64(seed);

        loop {
            let password = random_password(&mut rng);
            tokio::select! {
                res = self.tx.send(password) => {
                    if res.is_err() {
                        break;
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        tracing::debug!("password generator stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::watch;
    use tokio::time::{Duration, timeout};

    #[test]
    fn alphabet_has_no_ambiguous_characters() {
        for b in b"0O1lI" {
            assert!(!ALPHABET.contains(b), "{} should be excluded", *b as char);
        }
    }

    #[test]
    fn passwords_are_full_length_and_in_alphabet() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let password = random_password(&mut rng);
            assert_eq!(password.len(), MAX_PASSWORD_LENGTH);
            assert!(password.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn successive_passwords_differ() {
        let mut rng = SmallRng::seed_from_u64(7);
        let first = random_password(&mut rng);
        let second = random_password(&mut rng);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn generator_fills_queue_and_stops_on_shutdown() {
        let (tx, mut rx) = password_queue();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let generator = PasswordGenerator::new(tx);
        let task = tokio::spawn(async move { generator.start(shutdown_rx).await });

        let password = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("generator should produce quickly")
            .expect("channel open");
        assert_eq!(password.len(), MAX_PASSWORD_LENGTH);

        shutdown_tx.send(true).expect("signal shutdown");
        timeout(Duration::from_secs(1), task)
            .await
            .expect("generator should stop on shutdown")
            .expect("generator task should not panic");
    }

    #[tokio::test]
    async fn generator_stops_when_consumers_are_gone() {
        let (tx, rx) = password_queue();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let generator = PasswordGenerator::new(tx);
        let task = tokio::spawn(async move { generator.start(shutdown_rx).await });

        drop(rx);
        timeout(Duration::from_secs(1), task)
            .await
            .expect("generator should stop once the receiver is dropped")
            .expect("generator task should not panic");
    }
}
