use std::{io, path::Path, sync::Arc};

use tracing::{debug, info, warn};

use crate::{
    aws::CredentialArtifact,
    clock::{Clock, SystemClock},
    config::ResolvedConfig,
    error::{Error, Result},
    exchange::{AssumeRoleRequest, RoleExchange},
    store::CredentialStore,
};

/// Hands out temporary credentials, reusing the cached artifact while it is fresh.
///
/// Each call performs at most one exchange and one store write, in order:
/// read, decide, exchange, write. Concurrent calls against the same location
/// are not coordinated; overlapping refreshes each exchange and each write, and
/// the store keeps whichever write lands last.
pub struct CredentialBroker<E, S> {
    exchange: E,
    store: S,
    clock: Arc<dyn Clock>,
}

/// Why the cached artifact cannot be reused
#[derive(Debug)]
enum Staleness {
    Missing,
    Unreadable(io::Error),
    Malformed(serde_json::Error),
    Expired(CredentialArtifact),
}

impl<E: RoleExchange, S: CredentialStore> CredentialBroker<E, S> {
    pub fn new(exchange: E, store: S) -> Self {
        Self {
            exchange,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Return the cached artifact if it has not expired, otherwise assume the
    /// role and persist the new artifact before returning it.
    ///
    /// A cache that is missing, unreadable or malformed is never an error; it
    /// only forces a refresh.
    pub async fn get_temporary_credentials(
        &self,
        config: &ResolvedConfig,
    ) -> Result<CredentialArtifact> {
        let location = config.credentials.file_name.as_path();

        let staleness = match self.load_cached(location).await {
            Ok(cached) => {
                debug!(
                    "Using cached credentials from {} (expires {})",
                    location.display(),
                    cached.expiration()
                );
                return Ok(cached);
            }
            Err(staleness) => staleness,
        };

        match &staleness {
            Staleness::Missing => debug!("No cached credentials at {}", location.display()),
            Staleness::Unreadable(err) => {
                warn!("Failed to read cached credentials {}: {}", location.display(), err);
            }
            Staleness::Malformed(err) => {
                warn!(
                    "Ignoring malformed cached credentials {}: {}",
                    location.display(),
                    err
                );
            }
            Staleness::Expired(old) => info!("Cached credentials expired at {}", old.expiration()),
        }

        self.refresh(config).await
    }

    async fn load_cached(&self, location: &Path) -> Result<CredentialArtifact, Staleness> {
        let bytes = self.store.read(location).await.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                Staleness::Missing
            } else {
                Staleness::Unreadable(err)
            }
        })?;

        let cached = CredentialArtifact::from_slice(&bytes).map_err(Staleness::Malformed)?;

        if cached.is_expired_at(self.clock.now()) {
            return Err(Staleness::Expired(cached));
        }
        Ok(cached)
    }

    async fn refresh(&self, config: &ResolvedConfig) -> Result<CredentialArtifact> {
        let request = AssumeRoleRequest::from_config(config);
        info!("Requesting credentials for role: {}", request.role_arn);

        let fresh = self
            .exchange
            .assume_role(&request)
            .await
            .map_err(Error::ExchangeFailed)?;

        let location = &config.credentials.file_name;
        let store_write_failed = |source: io::Error| Error::StoreWriteFailed {
            path: location.clone(),
            source,
        };

        let bytes = fresh.to_vec().map_err(|err| store_write_failed(err.into()))?;
        self.store
            .write(location, &bytes, config.credentials.mode)
            .await
            .map_err(store_write_failed)?;

        info!(
            "Credentials saved to {} (expires {})",
            location.display(),
            fresh.expiration()
        );
        Ok(fresh)
    }
}
