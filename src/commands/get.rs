use std::{fmt::Write as _, path::PathBuf};

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::{
    aws::CredentialArtifact,
    config::{self, Config, KeyConfig, RoleConfig, StoreConfig},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The cached artifact as stored on disk
    #[default]
    Json,
    /// Shell `export` statements
    Env,
    /// AWS `credential_process` output
    Process,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GetCommand {
    #[arg(short = 'f', long, help = "Credential cache file [env: AWS_STS_FILE_NAME]")]
    pub file: Option<PathBuf>,

    #[arg(long, value_parser = parse_mode_arg, help = "Cache file permission bits in octal [env: AWS_STS_FILE_MODE]")]
    pub mode: Option<u32>,

    #[arg(short = 'r', long, help = "ARN of the role to assume [env: AWS_ROLE_ARN]")]
    pub role_arn: Option<String>,

    #[arg(short = 's', long, help = "Role session name [env: AWS_ROLE_SESSION_NAME]")]
    pub session_name: Option<String>,

    #[arg(short = 'd', long, help = "Session duration in seconds [env: AWS_ROLE_DURATION_SECONDS]")]
    pub duration_seconds: Option<i32>,

    #[arg(long, help = "AWS region used for STS [env: AWS_REGION]")]
    pub region: Option<String>,

    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Json, help = "Output format")]
    pub format: OutputFormat,
}

/// `credential_process` payload understood by the AWS CLI and SDKs
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ProcessCredentials<'a> {
    version: u8,
    access_key_id: &'a str,
    secret_access_key: &'a str,
    session_token: &'a str,
    expiration: String,
}

impl GetCommand {
    pub async fn execute(self) -> Result<()> {
        let format = self.format;
        let artifact = crate::get_temporary_credentials(self.into_config())
            .await
            .context("Failed to obtain temporary credentials")?;

        info!(
            "Credentials will expire at: {}",
            artifact.expiration().to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        println!("{}", render(&artifact, format)?);
        Ok(())
    }

    /// Flags become explicit config values; anything omitted is left for the environment
    pub fn into_config(self) -> Config {
        Config {
            credentials: StoreConfig {
                file_name: self.file,
                mode: self.mode,
            },
            role: RoleConfig {
                arn: self.role_arn,
                session_name: self.session_name,
                duration_seconds: self.duration_seconds,
            },
            key: KeyConfig::default(),
            region: self.region,
        }
    }
}

pub fn render(artifact: &CredentialArtifact, format: OutputFormat) -> Result<String> {
    let creds = &artifact.credentials;
    let expiration = creds.expiration.to_rfc3339_opts(SecondsFormat::Secs, true);

    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(artifact).context("Failed to serialize credentials")
        }
        OutputFormat::Env => {
            let mut out = String::new();
            for (name, value) in [
                ("AWS_ACCESS_KEY_ID", creds.access_key_id.as_str()),
                ("AWS_SECRET_ACCESS_KEY", creds.secret_access_key.as_str()),
                ("AWS_SESSION_TOKEN", creds.session_token.as_str()),
                ("AWS_CREDENTIAL_EXPIRATION", expiration.as_str()),
            ] {
                writeln!(out, "export {name}={}", shell_quote(value))?;
            }
            Ok(out.trim_end().to_string())
        }
        OutputFormat::Process => serde_json::to_string(&ProcessCredentials {
            version: 1,
            access_key_id: &creds.access_key_id,
            secret_access_key: &creds.secret_access_key,
            session_token: &creds.session_token,
            expiration,
        })
        .context("Failed to serialize credentials"),
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn parse_mode_arg(value: &str) -> Result<u32, String> {
    config::parse_mode(value).ok_or_else(|| format!("invalid octal file mode: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::Credentials;
    use chrono::{TimeZone, Utc};

    fn artifact() -> CredentialArtifact {
        CredentialArtifact::new(Credentials {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "wJalr/K7MDENG".to_string(),
            session_token: "FwoG'ZXIvYXdz".to_string(),
            expiration: Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap(),
        })
    }

    #[test]
    fn test_render_json_matches_cache_shape() {
        let rendered = render(&artifact(), OutputFormat::Json).unwrap();
        let parsed = CredentialArtifact::from_slice(rendered.as_bytes()).unwrap();
        assert_eq!(parsed, artifact());
    }

    #[test]
    fn test_render_env() {
        let rendered = render(&artifact(), OutputFormat::Env).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(
            lines,
            [
                "export AWS_ACCESS_KEY_ID='AKIAEXAMPLE'",
                "export AWS_SECRET_ACCESS_KEY='wJalr/K7MDENG'",
                r"export AWS_SESSION_TOKEN='FwoG'\''ZXIvYXdz'",
                "export AWS_CREDENTIAL_EXPIRATION='2026-10-19T12:00:00Z'",
            ]
        );
    }

    #[test]
    fn test_render_process() {
        let rendered = render(&artifact(), OutputFormat::Process).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["Version"], 1);
        assert_eq!(value["AccessKeyId"], "AKIAEXAMPLE");
        assert_eq!(value["SecretAccessKey"], "wJalr/K7MDENG");
        assert_eq!(value["SessionToken"], "FwoG'ZXIvYXdz");
        assert_eq!(value["Expiration"], "2026-10-19T12:00:00Z");
    }

    #[test]
    fn test_into_config_keeps_unset_fields_empty() {
        let cmd = GetCommand {
            role_arn: Some("arn:aws:iam::123:role/x".to_string()),
            duration_seconds: Some(900),
            ..Default::default()
        };

        let config = cmd.into_config();

        assert_eq!(config.role.arn.as_deref(), Some("arn:aws:iam::123:role/x"));
        assert_eq!(config.role.duration_seconds, Some(900));
        assert_eq!(config.role.session_name, None);
        assert_eq!(config.credentials.file_name, None);
        assert_eq!(config.credentials.mode, None);
        assert!(config.key.access.is_none());
    }

    #[test]
    fn test_parse_mode_arg() {
        assert_eq!(parse_mode_arg("0600"), Ok(0o600));
        assert!(parse_mode_arg("rw").is_err());
    }
}
