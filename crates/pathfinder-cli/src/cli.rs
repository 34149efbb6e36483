//! CLI argument parsing using clap.

use clap::Parser;
use std::path::PathBuf;

/// Default scan root, relative to the working directory.
pub const DEFAULT_ROOT_DIR: &str = "Pathfinder";

#[derive(Parser)]
#[command(name = "pathfinder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to search for files [default: ./Pathfinder]
    #[arg(short = 'd', value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Text file with file lists
    #[arg(short = 'l', value_name = "FILE", default_value = "./pathfinder.txt")]
    pub list_file: PathBuf,

    /// Output directory for the zip archive
    #[arg(short = 'p', value_name = "DIR", default_value = ".")]
    pub output_path: PathBuf,

    /// Output archive name [default: request-<YYYY-Mon-DD-HH-MM>.zip]
    #[arg(short = 'n', value_name = "NAME")]
    pub output_name: Option<String>,

    /// Compression level (1-9)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Follow symbolic links while walking
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long)]
    pub json: bool,
}

impl Cli {
    /// Scan root: the `-d` value, or `Pathfinder` under the working directory.
    pub fn root_dir(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(DEFAULT_ROOT_DIR)
        })
    }

    /// Log level implied by `-v` / `-q`.
    pub const fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Error
        } else if self.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        }
    }
}
