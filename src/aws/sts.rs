use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::{Client as StsClient, config::Credentials as StaticCredentials};
use aws_smithy_types::DateTime as SmithyDateTime;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{AssumedRoleUser, CredentialArtifact, Credentials};
use crate::{
    config::ResolvedConfig,
    exchange::{AssumeRoleRequest, RoleExchange},
};

/// Role exchange backed by AWS STS AssumeRole
#[derive(Debug, Clone)]
pub struct StsExchange {
    client: StsClient,
}

impl StsExchange {
    pub fn new(client: StsClient) -> Self {
        Self { client }
    }

    /// Build an STS client authenticated with the long-lived key pair of `config`.
    /// Falls back to the default AWS provider chain when no key pair is configured.
    pub async fn from_config(config: &ResolvedConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        match config.key.static_pair() {
            Some((access, secret)) => {
                debug!("Using configured long-lived access key for STS");
                loader = loader.credentials_provider(StaticCredentials::new(
                    access,
                    secret,
                    None,
                    None,
                    "sts-cache",
                ));
            }
            None => {
                debug!("No long-lived access key configured, using default provider chain");
            }
        }

        info!("Using region: {}", config.region);
        Self::new(StsClient::new(&loader.load().await))
    }
}

#[async_trait]
impl RoleExchange for StsExchange {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<CredentialArtifact> {
        info!("Calling AWS STS AssumeRole");
        debug!("Role ARN: {}", request.role_arn);
        debug!("Session name: {}", request.session_name);
        debug!("Duration: {} seconds", request.duration_seconds);

        let response = self
            .client
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.session_name)
            .duration_seconds(request.duration_seconds)
            .send()
            .await
            .context("Failed to assume role")?;

        let sts_creds = response
            .credentials()
            .context("AWS STS returned no credentials")?;

        let mut artifact = CredentialArtifact::new(Credentials {
            access_key_id: sts_creds.access_key_id().to_string(),
            secret_access_key: sts_creds.secret_access_key().to_string(),
            session_token: sts_creds.session_token().to_string(),
            expiration: to_chrono(sts_creds.expiration())?,
        });

        if let Some(user) = response.assumed_role_user() {
            artifact = artifact.with_assumed_role_user(AssumedRoleUser {
                assumed_role_id: user.assumed_role_id().to_string(),
                arn: user.arn().to_string(),
            });
        }

        info!("Successfully obtained AWS credentials");
        Ok(artifact)
    }
}

fn to_chrono(expiration: &SmithyDateTime) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(expiration.secs(), expiration.subsec_nanos())
        .with_context(|| format!("AWS STS returned an out-of-range expiration: {expiration:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_chrono_keeps_remote_expiry() {
        let smithy = SmithyDateTime::from_secs_and_nanos(1_792_411_200, 500);
        let converted = to_chrono(&smithy).unwrap();

        assert_eq!(converted.timestamp(), 1_792_411_200);
        assert_eq!(converted.timestamp_subsec_nanos(), 500);
    }

    #[test]
    fn test_to_chrono_epoch() {
        let converted = to_chrono(&SmithyDateTime::from_secs(0)).unwrap();
        assert_eq!(converted, Utc.timestamp_opt(0, 0).unwrap());
    }
}
