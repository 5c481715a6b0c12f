use clap::Parser;
use tracing_subscriber::EnvFilter;

use pwvault::cli::{self, Cli};

/// Environment variable holding the log filter (e.g. `debug`).
const LOG_ENV: &str = "PWVAULT_LOG";

fn main() {
    init_tracing("warn");

    let cli = Cli::parse();

    if let Err(e) = cli::run(&cli) {
        cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr so `pwvault get` output stays pipeable.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
