//! Diagnostic logging.
//!
//! User-facing progress goes through [`crate::output`] on stdout. Everything
//! else (HTTP requests, cache decisions, skipped documents) is a `tracing`
//! event written to stderr, filtered by `RUST_LOG` or `--verbose`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn init_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("spacetraveling=debug,info")
    } else {
        EnvFilter::new("spacetraveling=warn")
    }
}
