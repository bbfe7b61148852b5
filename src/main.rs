//! Main entry point for drivecurate CLI

use clap::Parser;
use drivecurate::cli::Cli;
use drivecurate::commands::execute_command;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the default level
    env_logger::Builder::new()
        .filter_level(drivecurate::cli::log_level(cli.verbose))
        .parse_default_env()
        .init();

    // Execute the command
    if let Err(e) = execute_command(cli.command, cli.quiet) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
