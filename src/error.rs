//! Errors surfaced by the credential broker

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures reported to callers of the broker.
///
/// A failed or malformed read of the cached artifact is not an error: it only
/// means the artifact is stale and has to be replaced.
#[derive(Debug, Error)]
pub enum Error {
    /// The role exchange was rejected or never reached the remote side.
    /// Nothing was written to the store.
    #[error("role exchange failed: {0:#}")]
    ExchangeFailed(#[source] anyhow::Error),

    /// Fresh credentials were obtained but could not be persisted.
    /// The unpersisted credentials are discarded.
    #[error("failed to write credentials to {}", path.display())]
    StoreWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
