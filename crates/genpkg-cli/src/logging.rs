//! Tracing subscriber initialisation
//!
//! `genpkg-core` only emits events; the binary decides where they go.
//! Diagnostics are off unless `GENPKG_LOG` asks for them, so prompt output
//! stays clean.

use std::io::IsTerminal as _;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the filter directive (e.g. `debug`, `genpkg_core=trace`)
pub const LOG_ENV: &str = "GENPKG_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber, writing to stderr
pub fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}
