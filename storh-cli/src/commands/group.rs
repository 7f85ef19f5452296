//! Group command - print the resolved group.

use anyhow::Result;

use storh_store::Config;

use super::prepare;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Runs the group command.
pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let feed = prepare(config)?;
    let connection = feed.bootstrap.connect(feed.credentials).await?;

    match cli.format {
        OutputFormat::Text => println!("{}", connection.group),
        OutputFormat::Json => {
            let output = serde_json::json!({ "group": connection.group });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}
