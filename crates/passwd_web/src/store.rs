use crate::error::StoreError;
use std::io::{Read, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

/// Best-effort durable storage for the request counter.
///
/// The backing file is opened once at startup and owned for the process
/// lifetime. Without a configured path every operation is a no-op and the
/// counter lives purely in memory.
#[derive(Debug)]
pub struct CounterStore {
    inner: Option<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    path: PathBuf,
    // Dedicated lock: overlapping flushes serialize here, never on the
    // counter lock.
    file: Mutex<File>,
}

impl CounterStore {
    /// Open (creating if absent) the backing file and parse the persisted
    /// count. Returns the store plus the counter's starting value.
    ///
    /// A file holding anything other than a decimal count (trailing
    /// whitespace tolerated) is a fatal startup error.
    pub fn open(path: Option<&Path>) -> Result<(Self, u64), StoreError> {
        let Some(path) = path else {
            return Ok((Self { inner: None }, 0));
        };

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|source| StoreError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let initial = match contents.trim() {
            "" => 0,
            text => text.parse().map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
        };

        let inner = StoreInner {
            path: path.to_path_buf(),
            file: Mutex::new(File::from_std(file)),
        };
        Ok((Self { inner: Some(inner) }, initial))
    }

    /// Whether a backing file is configured.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Overwrite the persisted count with `value` and sync it to storage.
    ///
    /// Best effort: failures are logged and swallowed, serving continues.
    /// Safe to call concurrently; the file lock serializes writers.
    pub async fn flush(&self, value: u64) {
        let Some(inner) = &self.inner else { return };
        if let Err(error) = inner.write(value).await {
            tracing::warn!(path = %inner.path.display(), %error, "failed to persist counter");
        }
    }
}

impl StoreInner {
    async fn write(&self, value: u64) -> std::io::Result<()> {
        let mut file = self.file.lock().await;
        // The counter is monotonic, so the decimal text never shrinks;
        // rewriting in place fully replaces the previous record.
        file.seek(SeekFrom::Start(0)).await?;
        file.write_all(value.to_string().as_bytes()).await?;
        file.sync_all().await?;
        Ok(())
    }
}
