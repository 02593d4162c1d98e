//! Main entry point for the binmerge CLI tool

use binmerge::cli::{Args, init_logger, run_cli};
use clap::Parser;
use colored::Colorize;

fn main() {
    let args = Args::parse();
    init_logger(args.verbose, args.quiet);

    if let Err(e) = run_cli(args) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
