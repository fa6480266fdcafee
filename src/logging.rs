//! Diagnostic logging setup
//!
//! Diagnostics are emitted with `tracing` and written to stderr, keeping
//! stdout for the prompts and status lines the user reads. The filter comes
//! from `PLINSTALL_LOG` (standard `EnvFilter` directives) when set, otherwise
//! from the number of `-v` flags.

use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_LOG_FILTER, ENV_LOG_FILTER};

/// Maps `-v` occurrences to a filter directive
pub fn filter_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => DEFAULT_LOG_FILTER,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber
///
/// Calling it more than once is harmless; later calls keep the first
/// subscriber.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(ENV_LOG_FILTER)
        .unwrap_or_else(|_| EnvFilter::new(filter_for_verbosity(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_verbosity() {
        assert_eq!(filter_for_verbosity(0), "warn");
        assert_eq!(filter_for_verbosity(1), "info");
        assert_eq!(filter_for_verbosity(2), "debug");
        assert_eq!(filter_for_verbosity(9), "trace");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(0);
        init(2);
    }
}
