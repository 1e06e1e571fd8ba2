//! Tracing subscriber installation.
//!
//! Library code only emits `tracing` events; binaries call [`init_tracing`]
//! once at startup to print them.

use std::env;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

static TRACING_INSTALLED: OnceLock<bool> = OnceLock::new();

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// Safe to call repeatedly. Returns `false` when another global subscriber
/// was already installed, which is then left in place.
pub fn init_tracing() -> bool {
    *TRACING_INSTALLED.get_or_init(|| {
        let directives = env::var(EnvFilter::DEFAULT_ENV).ok();
        let installed = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_filter(filter_from(directives.as_deref())),
            )
            .try_init()
            .is_ok();
        if !installed {
            tracing::debug!("global tracing subscriber already set; keeping it");
        }
        installed
    })
}

/// Parses filter directives, falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .and_then(|text| EnvFilter::try_new(text).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
