// Tracing initialization for the CLI; logs go to stderr so JSON output stays clean.
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter for a `-v` count when `RUST_LOG` is unset
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_tracing(verbose: u8) {
    // Prefer RUST_LOG from env, otherwise the verbosity flag.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level_for(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
