use std::path::PathBuf;
use thiserror::Error;

/// Fatal startup errors from the counter store.
///
/// The service refuses to start with an ambiguous counter value, so every
/// variant here aborts the binary before the listener comes up.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open counter file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read counter file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("counter file {path} does not contain a valid count: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: std::num::ParseIntError,
    },
}
