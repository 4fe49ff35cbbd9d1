//! TubeSieve CLI — filter content-listing payloads against declarative rules.
//!
//! Reads a JSON payload, removes the content items matching the configured
//! rules, and writes the pruned payload to stdout.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
