//! tracing subscriber for hosts that load the library

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber once per process
///
/// `RUST_LOG` wins over the config's debug switch.
pub(crate) fn init(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
