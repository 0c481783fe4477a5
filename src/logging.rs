//! Logging setup.
//!
//! Log output goes to stderr so that text reports on stdout stay clean.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level
/// (0 = info, 1 = debug, 2+ = trace).
///
/// ```no_run
/// u_roster::logging::init(0);
/// ```
pub fn init(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Initializes logging for tests. Safe to call repeatedly.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
