use std::{collections::HashMap, env, fmt, path::PathBuf};

use tracing::warn;

use crate::constants::{
    DEFAULT_AWS_REGION, DEFAULT_SESSION_DURATION_SECONDS, DEFAULT_SESSION_NAME,
    DEFAULT_STORE_FILE_MODE, DEFAULT_STORE_FILE_NAME, ENV_ACCESS_KEY, ENV_ACCESS_SECRET,
    ENV_DEFAULT_REGION, ENV_REGION, ENV_ROLE_ARN, ENV_ROLE_DURATION_SECONDS,
    ENV_ROLE_SESSION_NAME, ENV_STORE_FILE_MODE, ENV_STORE_FILE_NAME,
};

/// Variables consulted by [`Config::resolve`]
const ENV_KEYS: [&str; 9] = [
    ENV_STORE_FILE_NAME,
    ENV_STORE_FILE_MODE,
    ENV_ROLE_ARN,
    ENV_ROLE_SESSION_NAME,
    ENV_ROLE_DURATION_SECONDS,
    ENV_ACCESS_KEY,
    ENV_ACCESS_SECRET,
    ENV_REGION,
    ENV_DEFAULT_REGION,
];

/// Snapshot of environment variables used to fill unset config fields.
///
/// Empty values are treated as unset.
#[derive(Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the variables this crate reads from the process environment.
    /// Values that are not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        ENV_KEYS
            .iter()
            .filter_map(|key| match env::var(key) {
                Ok(value) => Some((*key, value)),
                Err(env::VarError::NotPresent) => None,
                Err(env::VarError::NotUnicode(_)) => {
                    warn!("Ignoring non UTF-8 value for {}", key);
                    None
                }
            })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Partial configuration supplied by the caller. Unset fields are resolved
/// from the environment, then from built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub credentials: StoreConfig,
    pub role: RoleConfig,
    pub key: KeyConfig,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub file_name: Option<PathBuf>,
    pub mode: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleConfig {
    pub arn: Option<String>,
    pub session_name: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Clone, Default)]
pub struct KeyConfig {
    pub access: Option<String>,
    pub secret: Option<String>,
}

/// Fully resolved configuration consumed by the broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub credentials: ResolvedStore,
    pub role: ResolvedRole,
    pub key: ResolvedKey,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStore {
    pub file_name: PathBuf,
    pub mode: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRole {
    pub arn: String,
    pub session_name: String,
    pub duration_seconds: i32,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub access: String,
    pub secret: String,
}

impl ResolvedKey {
    /// The long-lived key pair, if both halves are configured
    pub fn static_pair(&self) -> Option<(&str, &str)> {
        (!self.access.is_empty() && !self.secret.is_empty())
            .then_some((self.access.as_str(), self.secret.as_str()))
    }
}

impl Config {
    /// Fill every unset field from `env`, then from defaults. Explicit values always win.
    pub fn resolve(self, env: &Environment) -> ResolvedConfig {
        let credentials = ResolvedStore {
            file_name: self
                .credentials
                .file_name
                .or_else(|| env.get(ENV_STORE_FILE_NAME).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE_NAME)),
            mode: self
                .credentials
                .mode
                .or_else(|| env_parsed(env, ENV_STORE_FILE_MODE, parse_mode))
                .unwrap_or(DEFAULT_STORE_FILE_MODE),
        };

        let role = ResolvedRole {
            arn: self
                .role
                .arn
                .or_else(|| env_string(env, ENV_ROLE_ARN))
                .unwrap_or_default(),
            session_name: self
                .role
                .session_name
                .or_else(|| env_string(env, ENV_ROLE_SESSION_NAME))
                .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string()),
            duration_seconds: self
                .role
                .duration_seconds
                .or_else(|| {
                    env_parsed(env, ENV_ROLE_DURATION_SECONDS, |s| s.trim().parse().ok())
                })
                .unwrap_or(DEFAULT_SESSION_DURATION_SECONDS),
        };

        let key = ResolvedKey {
            access: self
                .key
                .access
                .or_else(|| env_string(env, ENV_ACCESS_KEY))
                .unwrap_or_default(),
            secret: self
                .key
                .secret
                .or_else(|| env_string(env, ENV_ACCESS_SECRET))
                .unwrap_or_default(),
        };

        let region = self
            .region
            .or_else(|| env_string(env, ENV_REGION))
            .or_else(|| env_string(env, ENV_DEFAULT_REGION))
            .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string());

        ResolvedConfig {
            credentials,
            role,
            key,
            region,
        }
    }
}

/// Parse octal permission bits such as `600`, `0600` or `0o600`.
/// Zero is rejected so a cache file is never written without owner access.
pub fn parse_mode(value: &str) -> Option<u32> {
    let value = value.trim();
    let digits = value.strip_prefix("0o").unwrap_or(value);
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|mode| *mode != 0 && *mode <= 0o7777)
}

fn env_string(env: &Environment, key: &str) -> Option<String> {
    env.get(key).map(str::to_string)
}

fn env_parsed<T>(env: &Environment, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let raw = env.get(key)?;
    let parsed = parse(raw);
    if parsed.is_none() {
        warn!("Ignoring invalid value for {}: {:?}", key, raw);
    }
    parsed
}

// Values may hold secrets, so only the names are shown
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Environment").field("keys", &keys).finish()
    }
}

impl fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyConfig")
            .field("access", &self.access)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for ResolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedKey")
            .field("access", &self.access)
            .field("secret", &"<redacted>")
            .finish()
    }
}
