use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temporary credentials as returned by STS AssumeRole and persisted in the cache file.
///
/// The JSON shape mirrors the AssumeRole response body, so a cache file can be
/// produced or inspected with any STS tooling. Only `Credentials` and
/// `AssumedRoleUser` are kept: other members of a cached file, such as
/// `ResponseMetadata`, are dropped when it is parsed and do not appear when the
/// artifact is serialized again.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialArtifact {
    pub credentials: Credentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumed_role_user: Option<AssumedRoleUser>,
}

/// The access key, secret and session token bundle with its remote-side expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssumedRoleUser {
    pub assumed_role_id: String,
    pub arn: String,
}

impl CredentialArtifact {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            assumed_role_user: None,
        }
    }

    pub fn with_assumed_role_user(mut self, user: AssumedRoleUser) -> Self {
        self.assumed_role_user = Some(user);
        self
    }

    /// Parse a persisted artifact
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Serialize for persistence
    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.credentials.expiration
    }

    /// Credentials expiring exactly at `now` are already unusable.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.credentials.expiration <= now
    }
}

impl fmt::Debug for CredentialArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialArtifact")
            .field("credentials", &self.credentials)
            .field("assumed_role_user", &self.assumed_role_user)
            .finish()
    }
}

// Secret and session token stay out of Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}
