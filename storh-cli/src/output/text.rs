//! Text output formatting with column alignment and colors.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use storh_core::{DisplayConfig, GroupId, Snapshot};
use storh_fetch::BootstrapState;
use storh_store::{Config, CredentialSource, FeedState};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GRAY: &str = "\x1b[90m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Column headers
const MANUFACTURER: &str = "Manufacturer";
const ITEM: &str = "Item";
const COUNT: &str = "Count";

/// Rows at or below this opacity are drawn gray as well as dim.
const FAINT_OPACITY: f64 = 0.5;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the whole feed: table, placeholder, or stale-data note.
    pub fn format_feed(&self, state: &FeedState, display: &DisplayConfig) -> String {
        let Some(snapshot) = &state.snapshot else {
            let mut out = self.format_loading(None);
            if let Some(error) = &state.last_error {
                out.push('\n');
                out.push_str(&self.red(&format!("Last attempt failed: {error}")));
            }
            return out;
        };

        let mut out = self.format_table(snapshot, display);
        if let Some(error) = &state.last_error {
            out.push_str("\n\n");
            out.push_str(&self.format_stale_note(error, snapshot.fetched_at));
        }
        out
    }

    /// Formats a snapshot as an aligned table.
    pub fn format_table(&self, snapshot: &Snapshot, display: &DisplayConfig) -> String {
        if snapshot.is_empty() {
            return self.dim("The shopping list is empty");
        }

        let header_width = |h: &str| if display.show_header { h.chars().count() } else { 0 };
        let manu_width = snapshot
            .items
            .iter()
            .map(|i| i.manufacturer.chars().count())
            .max()
            .unwrap_or(0)
            .max(header_width(MANUFACTURER));
        let name_width = snapshot
            .items
            .iter()
            .map(|i| i.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(header_width(ITEM));
        let count_width = snapshot
            .items
            .iter()
            .map(|i| i.count.to_string().chars().count())
            .max()
            .unwrap_or(0)
            .max(header_width(COUNT));

        let mut lines = Vec::with_capacity(snapshot.len() + 2);
        if display.show_header {
            let header = format!(
                "{MANUFACTURER:<manu_width$}  {ITEM:<name_width$}  {COUNT:>count_width$}"
            );
            lines.push(self.bold(&header));
            lines.push("─".repeat(manu_width + name_width + count_width + 4));
        }

        let opacities = display.row_opacities(snapshot.len());
        for (item, opacity) in snapshot.items.iter().zip(opacities) {
            let row = format!(
                "{:<manu_width$}  {:<name_width$}  {:>count_width$}",
                item.manufacturer, item.name, item.count
            );
            lines.push(self.faded(&row, opacity));
        }

        lines.join("\n")
    }

    /// Formats the placeholder shown before the first snapshot.
    pub fn format_loading(&self, phase: Option<BootstrapState>) -> String {
        match phase {
            Some(BootstrapState::Unauthenticated) | None => self.dim("Loading…"),
            Some(state) => self.dim(&format!("Loading… ({state})")),
        }
    }

    /// Formats the annotation shown under data that failed to refresh.
    pub fn format_stale_note(&self, error: &str, fetched_at: DateTime<Utc>) -> String {
        let since = fetched_at.with_timezone(&Local).format("%H:%M:%S");
        self.yellow(&format!("⚠ Update failed: {error} (showing list from {since})"))
    }

    /// Formats the watch mode title line.
    pub fn format_watch_header(
        &self,
        group: Option<&GroupId>,
        interval: Duration,
        now: DateTime<Local>,
    ) -> String {
        let group = group.map_or_else(String::new, |g| format!(" - group {}", self.cyan(g.as_str())));
        format!(
            "{}{} - {} (refresh: {}s)",
            self.bold("StorH"),
            group,
            now.format("%H:%M:%S"),
            interval.as_secs()
        )
    }

    /// Formats the result of a credential check.
    pub fn format_check(
        &self,
        email: &str,
        password_source: CredentialSource,
        accepted: bool,
    ) -> String {
        if accepted {
            format!(
                "{} Logged in as {} (password from {password_source})",
                self.green("✓"),
                self.cyan(email)
            )
        } else {
            format!(
                "{} Login rejected for {} (password from {password_source})",
                self.red("✗"),
                self.cyan(email)
            )
        }
    }

    /// Formats the effective configuration. Pass a redacted config.
    pub fn format_config(&self, config: &Config, path: &Path) -> String {
        let unset = self.dim("(not set)");
        let display = &config.display;

        let lines = [
            self.bold("StorH Configuration"),
            "─".repeat(40),
            format!("File:          {}", path.display()),
            String::new(),
            format!("Service:       {}", config.service.base_url),
            format!("Timeout:       {}s", config.service.request_timeout_secs),
            format!(
                "Email:         {}",
                config.account.email.clone().unwrap_or_else(|| unset.clone())
            ),
            format!(
                "Password:      {}",
                config.account.password.clone().unwrap_or_else(|| unset.clone())
            ),
            format!("Log level:     {}", config.log_level),
            String::new(),
            format!("Show header:   {}", display.show_header),
            format!("Max items:     {}", display.max_items),
            format!("Fade:          {}", display.fade),
            format!("Fade point:    {}", display.fade_point),
            format!("Animation:     {}ms", display.animation_speed_ms),
        ];
        lines.join("\n")
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn faded(&self, text: &str, opacity: f64) -> String {
        if !self.use_colors || opacity >= 1.0 {
            text.to_string()
        } else if opacity > FAINT_OPACITY {
            format!("{DIM}{text}{RESET}")
        } else {
            format!("{DIM}{GRAY}{text}{RESET}")
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

// ============================================================================
// Tests
// ============================================================================
