// src/logging.rs
// =============================================================================
// Diagnostics setup.
//
// Everything goes to stderr: stdout may be carrying the result stream, and
// a log line in the middle of JSON output would corrupt it.
//
// Level selection:
// - RUST_LOG, if set, wins (e.g. RUST_LOG=prowl=trace,reqwest=debug)
// - otherwise -v flags raise prowl's own level; dependencies stay at warn
// =============================================================================

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Call once, early in main.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();

    if let Err(e) = installed {
        eprintln!("Warning: logging disabled: {}", e);
    }
}

fn default_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("warn,prowl={}", level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directives(0), "warn,prowl=warn");
        assert_eq!(default_directives(1), "warn,prowl=info");
        assert_eq!(default_directives(2), "warn,prowl=debug");
        assert_eq!(default_directives(9), "warn,prowl=trace");
    }

    #[test]
    fn test_directives_parse() {
        for verbosity in 0..4 {
            assert!(EnvFilter::try_new(default_directives(verbosity)).is_ok());
        }
    }
}
