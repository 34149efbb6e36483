//! Pathfinder CLI - collect files matching a rule file into a ZIP archive.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use env_logger::Target;

fn main() {
    let cli = cli::Cli::parse();

    // Logs share stdout with progress unless stdout carries JSON
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .target(if cli.json {
            Target::Stderr
        } else {
            Target::Stdout
        })
        .init();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    if let Err(e) = commands::collect::execute(&cli, &*formatter) {
        formatter.format_error(&e);
        std::process::exit(1);
    }
}
