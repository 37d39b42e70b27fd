use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{CompletionsCommand, GetCommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "sts-cache", version, about = "Cache temporary AWS STS AssumeRole credentials", long_about = None, arg_required_else_help = false)]
pub struct Cli {
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Print temporary credentials, refreshing the cache when stale")]
    Get(GetCommand),
    #[command(about = "Generate shell completion scripts for sts-cache")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command.unwrap_or_default() {
            Commands::Get(cmd) => cmd.execute().await,
            Commands::Completions(cmd) => {
                cmd.execute();
                Ok(())
            }
        }
    }
}

impl Default for Commands {
    fn default() -> Self {
        Self::Get(GetCommand::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::OutputFormat;
    use clap::{CommandFactory, error::ErrorKind};
    use std::path::PathBuf;

    #[test]
    fn test_default_command_is_get() {
        let cli = Cli::try_parse_from(["sts-cache"]).unwrap();
        assert!(cli.command.is_none());

        match cli.command.unwrap_or_default() {
            Commands::Get(cmd) => {
                assert_eq!(cmd.role_arn, None);
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            _ => panic!("Expected Get command as default"),
        }
    }

    #[test]
    fn test_get_with_all_flags() {
        let cli = Cli::try_parse_from([
            "sts-cache",
            "get",
            "--file",
            "/tmp/sts.json",
            "--mode",
            "0640",
            "--role-arn",
            "arn:aws:iam::123:role/x",
            "--session-name",
            "s",
            "--duration-seconds",
            "900",
            "--region",
            "eu-west-1",
            "--format",
            "env",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Get(cmd)) => {
                assert_eq!(cmd.file, Some(PathBuf::from("/tmp/sts.json")));
                assert_eq!(cmd.mode, Some(0o640));
                assert_eq!(cmd.role_arn.as_deref(), Some("arn:aws:iam::123:role/x"));
                assert_eq!(cmd.session_name.as_deref(), Some("s"));
                assert_eq!(cmd.duration_seconds, Some(900));
                assert_eq!(cmd.region.as_deref(), Some("eu-west-1"));
                assert_eq!(cmd.format, OutputFormat::Env);
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn test_get_short_flags() {
        let cli = Cli::try_parse_from([
            "sts-cache", "get", "-r", "arn:aws:iam::123:role/x", "-s", "s", "-d", "900", "-o",
            "process",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Get(cmd)) => {
                assert_eq!(cmd.role_arn.as_deref(), Some("arn:aws:iam::123:role/x"));
                assert_eq!(cmd.session_name.as_deref(), Some("s"));
                assert_eq!(cmd.duration_seconds, Some(900));
                assert_eq!(cmd.format, OutputFormat::Process);
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn test_invalid_mode_fails() {
        let result = Cli::try_parse_from(["sts-cache", "get", "--mode", "rw-------"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_format_fails() {
        let result = Cli::try_parse_from(["sts-cache", "get", "--format", "yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_completions_command_parsing() {
        let cli = Cli::try_parse_from(["sts-cache", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Completions(_))));
    }

    #[test]
    fn test_command_structure_validation() {
        let cmd = Cli::command();
        cmd.debug_assert();
    }

    #[test]
    fn test_invalid_command_fails() {
        let result = Cli::try_parse_from(["sts-cache", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag_works() {
        let result = Cli::try_parse_from(["sts-cache", "--help"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayHelp);
        }
    }

    #[test]
    fn test_version_flag_works() {
        let result = Cli::try_parse_from(["sts-cache", "--version"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayVersion);
        }
    }

    #[test]
    fn test_verbose_flag_multiple() {
        let cli = Cli::try_parse_from(["sts-cache", "-vvv", "get"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["sts-cache", "get", "--verbose", "--verbose"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_verbose_default_zero() {
        let cli = Cli::try_parse_from(["sts-cache", "get"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }
}
