//! ordctl - operator CLI for sequence counters and identifier templates.
//!
//! Populates templates out-of-band, runs migrations, and exposes allocation,
//! formatting, and search-token resolution for scripting and debugging.

use anyhow::Result;
use clap::Parser;

mod commands;
mod error;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_tracing();

    // Run the command
    if let Err(e) = cli.run().await {
        // Print error in a user-friendly way
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
