//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging panel
//! lifecycle and drag/drop state transitions.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=dockyard::group=debug` - module-level filtering
//! - `RUST_LOG=dockyard::event=trace` - every event dispatch
//!
//! # Log Files
//!
//! Logs are written to `~/.config/dockyard/logs/dockyard.log` with daily rotation.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::api::PanelApi;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`). File logging writes
/// debug level to the logs dir with daily rotation. Does nothing if a global
/// subscriber is already installed.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "dockyard.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Lightweight snapshot of a panel's API state for diffing
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSnapshot {
    pub id: String,
    pub is_focused: bool,
    pub is_active: bool,
    pub is_visible: bool,
    pub is_hidden: bool,
    pub width: f32,
    pub height: f32,
}

impl PanelSnapshot {
    pub fn from_api(api: &PanelApi) -> Self {
        Self {
            id: api.id().to_string(),
            is_focused: api.is_focused(),
            is_active: api.is_active(),
            is_visible: api.is_visible(),
            is_hidden: api.is_hidden(),
            width: api.width(),
            height: api.height(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &PanelSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        let flags = [
            ("focused", self.is_focused, other.is_focused),
            ("active", self.is_active, other.is_active),
            ("visible", self.is_visible, other.is_visible),
            ("hidden", self.is_hidden, other.is_hidden),
        ];
        for (name, before, after) in flags {
            if before != after {
                changes.push(format!("{}: {} → {}", name, before, after));
            }
        }

        if self.width != other.width || self.height != other.height {
            changes.push(format!(
                "size: {}x{} → {}x{}",
                self.width, self.height, other.width, other.height
            ));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
