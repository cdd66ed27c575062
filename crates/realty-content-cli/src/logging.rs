//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber on stderr.
///
/// `RUST_LOG` wins over `level`; `json` switches to structured output.
pub fn init(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("  logging already initialised: {e}");
    }
}

/// Effective level from the global flags.
pub fn level_for(log_level: &str, verbose: bool, quiet: bool) -> String {
    if verbose {
        "debug".to_string()
    } else if quiet {
        "error".to_string()
    } else {
        log_level.to_string()
    }
}
