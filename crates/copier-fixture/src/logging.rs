//! Tracing subscriber initialisation.
//!
//! Only this crate installs a subscriber; the core and adapter crates only
//! emit spans and events. Output goes through the test writer, so it is
//! captured per test and shown for failing tests only.
//!
//! `RUST_LOG` overrides the default filter, e.g.
//! `RUST_LOG=copier_fixture_adapters=debug cargo test` shows every
//! subprocess the fixtures run.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str =
    "copier_fixture=warn,copier_fixture_core=warn,copier_fixture_adapters=warn";

static INIT: Once = Once::new();

/// Initialise the global tracing subscriber.
///
/// Only the first call in a process does anything; later calls return
/// `Ok(())`. Fails if another subscriber was registered first.
pub fn init_logging() -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| result = install());
    result
}

fn install() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_test_writer();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn repeated_initialisation_is_tolerated() {
        let _ = init_logging();
        assert!(init_logging().is_ok());
    }
}
