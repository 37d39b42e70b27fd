/// Default location of the cached credential artifact
pub const DEFAULT_STORE_FILE_NAME: &str = "./.aws-sts.json";

/// Default permission bits of the cached credential artifact (owner read/write)
pub const DEFAULT_STORE_FILE_MODE: u32 = 0o600;

/// Default role session name
pub const DEFAULT_SESSION_NAME: &str = "temporary";

/// Default session duration in seconds (12 hours)
pub const DEFAULT_SESSION_DURATION_SECONDS: i32 = 43_200;

/// Default AWS region for STS operations when no region is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

// Environment variables consulted when a config field is unset
pub const ENV_STORE_FILE_NAME: &str = "AWS_STS_FILE_NAME";
pub const ENV_STORE_FILE_MODE: &str = "AWS_STS_FILE_MODE";
pub const ENV_ROLE_ARN: &str = "AWS_ROLE_ARN";
pub const ENV_ROLE_SESSION_NAME: &str = "AWS_ROLE_SESSION_NAME";
pub const ENV_ROLE_DURATION_SECONDS: &str = "AWS_ROLE_DURATION_SECONDS";
pub const ENV_ACCESS_KEY: &str = "AWS_STS_ACCESS_KEY";
pub const ENV_ACCESS_SECRET: &str = "AWS_STS_ACCESS_SECRET";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
