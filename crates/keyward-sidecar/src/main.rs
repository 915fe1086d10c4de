//! Keyward encryption sidecar entry point.
//!
//! Spawned by a parent supervisor with the framed command protocol on
//! stdin/stdout. stdout belongs exclusively to reply frames, so every
//! diagnostic goes to stderr.
//!
//! Exit status: 0 when the parent closes stdin at a frame boundary,
//! non-zero on protocol violations, transport failures, or internal
//! cryptographic failures.

use std::io;

use clap::Parser;

/// Keyward - master-key encryption sidecar
#[derive(Parser)]
#[command(name = "keyward-sidecar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output (implies --verbose)
    #[arg(short, long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    // stdout carries protocol frames; diagnostics must not touch it.
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(io::stderr)
        .init();

    tracing::info!("encryption sidecar ready");
    keyward_sidecar::run(io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}
