//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once, at process start
//! - Respect `RUST_LOG`, falling back to a sensible default filter
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Level configuration comes from the environment, not the config file,
//!   so it can be changed without touching route configuration

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `default_filter` is used when `RUST_LOG` is unset, e.g.
/// `"routewalk=debug,tower_http=debug"`.
pub fn init(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
