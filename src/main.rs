use std::process::ExitCode;

use clap::Parser;
use sts_cache::{Error, cli::Cli};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Exit status when the role exchange failed and the cache was left alone
const EXIT_EXCHANGE_FAILED: u8 = 2;
/// Exit status when credentials were issued but could not be cached
const EXIT_STORE_WRITE_FAILED: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match cli.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(Error::StoreWriteFailed { .. }) = e.downcast_ref::<Error>() {
                eprintln!("Temporary credentials were issued but not cached; nothing was printed.");
            }
            ExitCode::from(exit_status(&e))
        }
    }
}

fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(Error::ExchangeFailed(_)) => EXIT_EXCHANGE_FAILED,
        Some(Error::StoreWriteFailed { .. }) => EXIT_STORE_WRITE_FAILED,
        None => 1,
    }
}

fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // RUST_LOG overrides -v
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    // stdout carries the credentials
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::{io, path::PathBuf};

    #[test]
    fn test_exit_status_for_exchange_failure() {
        let err: anyhow::Result<()> = Err(Error::ExchangeFailed(anyhow::anyhow!("AccessDenied")))
            .context("Failed to obtain temporary credentials");
        assert_eq!(exit_status(&err.unwrap_err()), EXIT_EXCHANGE_FAILED);
    }

    #[test]
    fn test_exit_status_for_store_write_failure() {
        let err: anyhow::Result<()> = Err(Error::StoreWriteFailed {
            path: PathBuf::from("/cache/sts.json"),
            source: io::Error::other("disk full"),
        })
        .context("Failed to obtain temporary credentials");
        assert_eq!(exit_status(&err.unwrap_err()), EXIT_STORE_WRITE_FAILED);
    }

    #[test]
    fn test_exit_status_for_other_errors() {
        assert_eq!(exit_status(&anyhow::anyhow!("broken pipe")), 1);
    }
}
