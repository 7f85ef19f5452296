//! Config command - manage configuration.

use std::path::Path;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use tracing::info;

use storh_store::{default_config_dir, Config};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (password masked).
    Show,

    /// Show configuration paths.
    Path,

    /// Write a config file with default settings.
    Init {
        /// Account email to store.
        #[arg(long)]
        email: Option<String>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    let path = cli.config_path();
    match &args.action {
        ConfigAction::Show => show_config(cli, &path).await,
        ConfigAction::Path => show_paths(cli, &path),
        ConfigAction::Init { email, force } => init_config(&path, email.as_deref(), *force).await,
    }
}

async fn show_config(cli: &Cli, path: &Path) -> Result<()> {
    let config = Config::load_from(path).await?.redacted();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_config(&config, path));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli, path: &Path) -> Result<()> {
    let config_dir = default_config_dir();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(path: &Path, email: Option<&str>, force: bool) -> Result<()> {
    if tokio::fs::try_exists(path).await? && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let mut config = Config::default();
    config.account.email = email.map(str::to_string);
    config.save_to(path).await?;

    info!(path = %path.display(), "Config initialized");
    println!("Wrote {}", path.display());
    if config.account.password.is_none() {
        println!(
            "Set the password with STORH_PASSWORD, account.password, \
             or the keychain (service \"storh\", account = your email)."
        );
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
