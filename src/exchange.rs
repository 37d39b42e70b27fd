use anyhow::Result;
use async_trait::async_trait;

use crate::{aws::CredentialArtifact, config::ResolvedConfig};

/// Parameters of a single role assumption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub session_name: String,
    pub duration_seconds: i32,
}

impl AssumeRoleRequest {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            role_arn: config.role.arn.clone(),
            session_name: config.role.session_name.clone(),
            duration_seconds: config.role.duration_seconds,
        }
    }
}

/// The remote call that trades a role identifier for fresh temporary credentials.
///
/// Implementations own transport concerns such as timeouts and retries; the
/// broker calls `assume_role` at most once per request and surfaces any error as is.
#[async_trait]
pub trait RoleExchange: Send + Sync {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<CredentialArtifact>;
}

#[async_trait]
impl<T: RoleExchange + ?Sized> RoleExchange for std::sync::Arc<T> {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<CredentialArtifact> {
        (**self).assume_role(request).await
    }
}
