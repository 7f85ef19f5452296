//! Check command - verify credentials against the service.

use std::sync::Arc;

use anyhow::{Context, Result};

use storh_fetch::{FetchError, HttpClient, SessionManager};
use storh_store::{resolve_credentials, Config};

use crate::output::{CheckOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the check command.
///
/// Performs a single login; a rejected login is reported and turned into
/// a [`FetchError::LoginFailed`] so the exit code reflects it.
pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let resolved = resolve_credentials(&config.account)?;
    let email = resolved.credentials.email().to_string();

    let http = HttpClient::with_timeout(config.service.request_timeout())
        .context("Failed to build HTTP client")?;
    let session = SessionManager::new(
        Arc::new(http),
        &config.service.endpoints()?,
        resolved.credentials,
    )?;
    let accepted = session.login().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_check(&email, resolved.password_source, accepted)
            );
        }
        OutputFormat::Json => {
            let output = CheckOutput {
                email: email.clone(),
                password_source: resolved.password_source.to_string(),
                accepted,
            };
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    if accepted {
        Ok(())
    } else {
        Err(FetchError::LoginFailed(format!("the service rejected {email}")).into())
    }
}
