//! Logging setup and the state-change log observer
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=state=debug` - every StateBus transition
//! - `RUST_LOG=csvpad::app=debug` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/csvpad/logs/csvpad.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::bus::StateBus;
use crate::messages::StateChange;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`). File logging writes to
/// `~/.config/csvpad/logs/csvpad.log` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console goes to stderr so that --print output stays clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_PREFIX);
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

    if tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}

/// StateBus observer that logs every transition under the `state` target
pub fn log_state_changes(change: &StateChange, bus: &mut StateBus) {
    tracing::debug!(
        target: "state",
        field = change.field().name(),
        title = %bus.window_title(),
        "{}",
        change
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActiveView;

    #[test]
    fn test_log_observer_can_subscribe() {
        let mut bus = StateBus::new();
        bus.subscribe(log_state_changes);
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.set_active_view(ActiveView::Table));
    }
}
