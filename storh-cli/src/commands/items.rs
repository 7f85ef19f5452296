//! Items command - print the shopping list once.

use anyhow::Result;
use tracing::info;

use storh_store::Config;

use super::prepare;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the items command.
pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let feed = prepare(config)?;
    let connection = feed.bootstrap.connect(feed.credentials).await?;

    let snapshot = connection.scheduler.poll_once().await?;
    info!(items = snapshot.len(), group = %connection.group, "Fetched shopping list");

    let state = feed.store.current();
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_feed(&state, &config.display));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!(
                "{}",
                formatter.format_feed(&state, Some(&connection.group), &config.display)?
            );
        }
    }

    Ok(())
}
