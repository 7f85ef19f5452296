// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! StorH CLI - the shopping list from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Live view, refreshed every minute
//! storh
//!
//! # Print the list once
//! storh items
//!
//! # JSON output
//! storh items --format json --pretty
//!
//! # Verify credentials
//! storh check
//!
//! # Write a starter config
//! storh config init --email ola@example.no
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storh_fetch::FetchError;
use storh_store::{Config, StoreError};

use commands::{check, config, group, items, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// StorH CLI - shopping-list feed.
#[derive(Parser)]
#[command(name = "storh")]
#[command(about = "Shopping-list feed for the StorH inventory service")]
#[command(long_about = r#"
StorH keeps your shopping list on screen, refreshed every minute.

Credentials are read from the config file (account.email, account.password),
then STORH_EMAIL / STORH_PASSWORD, then the system keychain
(service "storh", account = your email).

Examples:
  storh                          # Live view (default)
  storh items                    # Print the list once
  storh items --format json      # JSON output
  storh check                    # Verify credentials
  storh config init              # Write a starter config
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'watch'.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Config file to use instead of the default location.
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, no error messages).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Config file path in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show the shopping list and keep it fresh (default).
    #[command(visible_alias = "w")]
    Watch,

    /// Fetch and print the shopping list once.
    #[command(visible_alias = "i")]
    Items,

    /// Print the group the feed reads from.
    Group,

    /// Verify that the configured credentials can log in.
    Check,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Login or re-authentication was rejected.
    AuthFailed = 2,
    /// The account has no group.
    NoGroup = 3,
    /// Config file or credentials are missing or invalid.
    ConfigError = 4,
    /// The service timed out or answered with an error; retrying may help.
    Unavailable = 5,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        for cause in error.chain() {
            if let Some(e) = cause.downcast_ref::<FetchError>() {
                return match e {
                    FetchError::LoginFailed(_) | FetchError::AuthenticationFailure(_) => {
                        Self::AuthFailed
                    }
                    FetchError::NoGroupAvailable => Self::NoGroup,
                    FetchError::InvalidUrl(_) => Self::ConfigError,
                    e if e.is_transient() => Self::Unavailable,
                    _ => Self::Error,
                };
            }
            if let Some(e) = cause.downcast_ref::<StoreError>() {
                return if e.is_user_error() {
                    Self::ConfigError
                } else {
                    Self::Error
                };
            }
        }
        Self::Error
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, config_level: &str) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("storh=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("storh={config_level}")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let loaded = Config::load_from(&cli.config_path()).await;

    setup_logging(
        cli.verbose,
        cli.quiet,
        loaded.as_ref().map_or("warn", |c| c.log_level.as_str()),
    );

    let result = match &cli.command {
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        command => match loaded {
            Ok(config) => run_feed_command(command.as_ref(), &cli, &config).await,
            Err(e) => Err(anyhow::Error::new(e).context(format!(
                "Could not load {}",
                cli.config_path().display()
            ))),
        },
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }
}

async fn run_feed_command(command: Option<&Commands>, cli: &Cli, config: &Config) -> Result<()> {
    match command {
        Some(Commands::Items) => items::run(cli, config).await,
        Some(Commands::Group) => group::run(cli, config).await,
        Some(Commands::Check) => check::run(cli, config).await,
        Some(Commands::Watch | Commands::Config(_)) | None => watch::run(cli, config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::try_parse_from(["storh"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.config_path(), Config::default_path());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["storh", "items", "--format", "json", "--config", "/tmp/s.json"])
                .unwrap();
        assert!(matches!(cli.command, Some(Commands::Items)));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn test_exit_codes() {
        let login = anyhow::Error::new(FetchError::LoginFailed("rejected".into()));
        assert_eq!(ExitCode::for_error(&login), ExitCode::AuthFailed);

        let group = anyhow::Error::new(FetchError::NoGroupAvailable).context("bootstrap");
        assert_eq!(ExitCode::for_error(&group), ExitCode::NoGroup);

        let creds = anyhow::Error::new(StoreError::MissingCredentials("email".into()));
        assert_eq!(ExitCode::for_error(&creds), ExitCode::ConfigError);

        let timeout = anyhow::Error::new(FetchError::Timeout(30));
        assert_eq!(ExitCode::for_error(&timeout), ExitCode::Unavailable);

        let outage = anyhow::Error::new(FetchError::UnexpectedStatus(503)).context("items");
        assert_eq!(ExitCode::for_error(&outage), ExitCode::Unavailable);

        let malformed = anyhow::Error::new(FetchError::MalformedResponse("eof".into()));
        assert_eq!(ExitCode::for_error(&malformed), ExitCode::Error);

        let other = anyhow::anyhow!("boom");
        assert_eq!(ExitCode::for_error(&other), ExitCode::Error);
    }
}
