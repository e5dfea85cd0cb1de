use tracing_subscriber::{fmt, EnvFilter};

/// Filter applied when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "pal_metrics=info";

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first successful call installs a
/// subscriber. Returns `false` when a global subscriber was already set,
/// either by an earlier call or by the host application.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt().with_env_filter(filter).with_target(true).compact().try_init().is_ok()
}
