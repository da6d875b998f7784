//! # draftloop-logging
//!
//! Logging for the draftloop writer-critique loop.
//!
//! ## Key Types
//!
//! - [`Logger`] - Structured event logging to the console and an optional JSONL file
//! - [`LogEvent`] - Log event types
//! - [`LogFormat`] - Console formats (Pretty, JSON, Compact)
//!
//! File output is always JSON lines with an RFC 3339 timestamp per event.
//! Log files record loop events only, never the conversation itself.

mod events;
mod paths;

pub use events::{LogEvent, LogFormat, Logger, Step};
pub use paths::{brief_hash, default_log_path};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
}
