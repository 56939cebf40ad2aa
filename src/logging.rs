//! Logging setup
//!
//! Events go to stderr so command output on stdout stays pipeable.
//! `RUST_LOG` overrides the level chosen on the command line, e.g.
//! `RUST_LOG=rotoworks::doc=debug`.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber
///
/// Returns `false` when a subscriber was already installed, in which case
/// nothing changes.
pub fn init(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(false)
        .try_init()
        .is_ok()
}

/// Level implied by the global `--quiet` / `--verbose` flags
pub fn level_for(quiet: bool, verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Logging for tests, captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(false, false), "info");
        assert_eq!(level_for(true, false), "warn");
        assert_eq!(level_for(false, true), "debug");
        assert_eq!(level_for(true, true), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_test();
        assert!(!init("info"));
        assert!(!init("debug"));
    }
}
