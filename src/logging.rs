//! Tracing subscriber setup.
//!
//! Logs always go to stderr: in `serve stdio` mode stdout carries the MCP
//! JSON-RPC stream and must stay clean.

use crate::config::LoggingConfig;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `[logging].level`. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let fallback_level = match config.level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init();
}
