pub mod credentials;
pub mod sts;

pub use credentials::{AssumedRoleUser, CredentialArtifact, Credentials};
pub use sts::StsExchange;
