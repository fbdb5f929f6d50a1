//! Tracing subscriber bootstrap. Grounded in the teacher's logging
//! setup pattern (env-filter driven, defaulting to `info` when
//! `RUST_LOG` is unset) and spec.md §4.14/§7's requirement that every
//! mapped error and degraded operation emit one structured log line.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber. Idempotent: a second
/// call is a no-op rather than a panic, since integration tests may
/// each try to initialize it.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
