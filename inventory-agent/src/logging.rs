use tracing::dispatcher;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Initialize logging on stderr
///
/// `RUST_LOG` wins when set; otherwise `debug` in verbose mode, `info` else.
/// Does nothing if a subscriber is already installed.
pub fn init_logging(verbose: bool) {
    if dispatcher::has_been_set() {
        return;
    }

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
