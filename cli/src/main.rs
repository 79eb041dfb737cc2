mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::render;
use texas_peaks::Variant;
use tracing_subscriber::EnvFilter;

/// Log to stderr; `RUST_LOG` wins over the `-v` count.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Basic(args) => render::run(Variant::Basic, args),
        Commands::Peaks(args) => render::run(Variant::Peaks, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
