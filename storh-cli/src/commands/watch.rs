//! Watch command - live shopping list.

use std::io::{stdout, Write};
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tracing::info;

use storh_core::{DisplayConfig, GroupId};
use storh_fetch::{BootstrapState, DEFAULT_POLL_INTERVAL};
use storh_store::{Config, FeedState};

use super::prepare;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Clears the terminal and moves the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Runs the watch command until Ctrl+C.
pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let feed = prepare(config)?;
    let renderer = Renderer::new(
        cli.format,
        !cli.no_color,
        &config.display,
        DEFAULT_POLL_INTERVAL,
    );
    info!(interval_ms = DEFAULT_POLL_INTERVAL.as_millis(), "Starting watch mode");

    let mut phases = feed.bootstrap.subscribe();
    let startup = feed.bootstrap.run(feed.credentials.clone(), DEFAULT_POLL_INTERVAL);
    tokio::pin!(startup);

    show(renderer.loading(BootstrapState::Unauthenticated))?;
    let running = loop {
        tokio::select! {
            result = &mut startup => break result?,
            Ok(()) = phases.changed() => {
                let phase = *phases.borrow_and_update();
                show(renderer.loading(phase))?;
            }
            _ = signal::ctrl_c() => {
                info!("Interrupted during startup");
                return Ok(());
            }
        }
    };

    let group = running.connection.group.clone();
    let mut updates = feed.store.subscribe();
    let initial = updates.borrow_and_update().clone();
    show(Some(renderer.feed(&initial, Some(&group))?))?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                show(Some(renderer.feed(&state, Some(&group))?))?;
            }
            _ = signal::ctrl_c() => {
                info!("Stopping watch mode");
                break;
            }
        }
    }

    running.shutdown().await;
    Ok(())
}

/// Writes a rendered frame to stdout.
fn show(frame: Option<String>) -> Result<()> {
    if let Some(frame) = frame {
        let mut out = stdout().lock();
        out.write_all(frame.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}

/// Renders feed states as frames in the selected output format.
///
/// Text frames redraw the whole screen. JSON frames are single lines, so
/// the output stream is NDJSON.
struct Renderer<'a> {
    format: OutputFormat,
    text: TextFormatter,
    json: JsonFormatter,
    display: &'a DisplayConfig,
    interval: Duration,
}

impl<'a> Renderer<'a> {
    fn new(
        format: OutputFormat,
        use_colors: bool,
        display: &'a DisplayConfig,
        interval: Duration,
    ) -> Self {
        Self {
            format,
            text: TextFormatter::new(use_colors),
            json: JsonFormatter::new(false),
            display,
            interval,
        }
    }

    /// Placeholder frame while bootstrapping; nothing in JSON mode.
    fn loading(&self, phase: BootstrapState) -> Option<String> {
        (self.format == OutputFormat::Text).then(|| {
            format!(
                "{CLEAR_SCREEN}{}\n\n{}\n",
                self.header(None),
                self.text.format_loading(Some(phase))
            )
        })
    }

    fn feed(&self, state: &FeedState, group: Option<&GroupId>) -> Result<String> {
        let frame = match self.format {
            OutputFormat::Text => format!(
                "{CLEAR_SCREEN}{}\n\n{}\n\nPress Ctrl+C to exit\n",
                self.header(group),
                self.text.format_feed(state, self.display)
            ),
            OutputFormat::Json => {
                format!("{}\n", self.json.format_feed(state, group, self.display)?)
            }
        };
        Ok(frame)
    }

    fn header(&self, group: Option<&GroupId>) -> String {
        self.text
            .format_watch_header(group, self.interval, chrono::Local::now())
    }
}

// ============================================================================
// Tests
// ============================================================================
