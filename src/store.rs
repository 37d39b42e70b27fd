//! Persistence of the cached credential artifact.
//!
//! Writes are last-writer-wins. Concurrent writers to the same location are not
//! coordinated.

use std::{io, path::Path};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

/// Durable key/value storage for the credential artifact
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the raw artifact. A missing artifact is `io::ErrorKind::NotFound`.
    async fn read(&self, location: &Path) -> io::Result<Vec<u8>>;

    /// Create or replace the artifact and restrict its permission bits to `mode`.
    async fn write(&self, location: &Path, bytes: &[u8], mode: u32) -> io::Result<()>;
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    async fn read(&self, location: &Path) -> io::Result<Vec<u8>> {
        (**self).read(location).await
    }

    async fn write(&self, location: &Path, bytes: &[u8], mode: u32) -> io::Result<()> {
        (**self).write(location, bytes, mode).await
    }
}

/// Store backed by the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FileStore;

#[async_trait]
impl CredentialStore for FileStore {
    async fn read(&self, location: &Path) -> io::Result<Vec<u8>> {
        fs::read(location).await
    }

    async fn write(&self, location: &Path, bytes: &[u8], mode: u32) -> io::Result<()> {
        if let Some(parent) = location.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(mode);

        let mut file = options.open(location).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        // The creation mode is ignored for files that already exist
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(location, std::fs::Permissions::from_mode(mode)).await?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        debug!("Wrote {} bytes to {}", bytes.len(), location.display());
        Ok(())
    }
}
