//! VISA Portal command-line shell
//!
//! Thin wrapper that loads configuration, sets up logging and hands each
//! subcommand to the portal. Lookup logic lives in the `crates/` directory.

pub mod cli;
pub mod commands;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing::info;

/// Initialize tracing subscriber for logging.
///
/// `RUST_LOG` wins; otherwise `-v` flags raise the default level.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = match verbose {
        0 => "warn,visa=info",
        1 => "info,visa=debug",
        _ => "debug,visa=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Parse arguments, run the subcommand and print its output.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    info!("Starting visa v{}", env!("CARGO_PKG_VERSION"));

    let config = commands::load_config(&cli)?;
    let output = commands::execute(&cli.command, &config).await?;
    print!("{output}");
    Ok(())
}
