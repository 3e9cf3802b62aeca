use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing to stderr so stdout carries only the JSON result.
///
/// `RUST_LOG` wins when set. Otherwise each `-v` raises `default_level` one step
/// (`info`, `debug`, `trace`).
pub fn init_logging(default_level: &str, verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => default_level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    // A subscriber may already be installed when embedded in a larger program.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
