//! Narrate CLI entry point.

use clap::Parser;
use narrate::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan(args) => cli::run_scan(&args),
        Commands::Render(args) => cli::run_render(&args),
        Commands::Inspect(args) => cli::run_inspect(&args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
