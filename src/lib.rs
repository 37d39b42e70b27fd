pub mod aws;
pub mod broker;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod exchange;
pub mod store;

pub use aws::{CredentialArtifact, Credentials};
pub use broker::CredentialBroker;
pub use config::{Config, Environment, ResolvedConfig};
pub use error::{Error, Result};

use aws::StsExchange;
use store::FileStore;

/// Resolve `config` against the current process environment and return
/// temporary credentials, refreshing the on-disk cache through AWS STS when it is stale.
pub async fn get_temporary_credentials(config: Config) -> Result<CredentialArtifact> {
    let config = config.resolve(&Environment::from_process());
    let exchange = StsExchange::from_config(&config).await;
    CredentialBroker::new(exchange, FileStore)
        .get_temporary_credentials(&config)
        .await
}
