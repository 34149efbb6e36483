//! Error conversion utilities for CLI.
//!
//! Converts pathfinder-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use pathfinder_core::PathfinderError;

/// Converts `PathfinderError` to user-friendly anyhow error with context
pub fn convert_pathfinder_error(err: PathfinderError) -> anyhow::Error {
    match err {
        PathfinderError::RootNotFound { path } => {
            anyhow!(
                "The specified directory does not exist: {}\n\
                 HINT: Pass the directory to scan with -d, or create ./Pathfinder.",
                path.display()
            )
        }
        PathfinderError::ConfigNotFound { path } => {
            anyhow!(
                "The specified list file does not exist: {}\n\
                 HINT: Pass the rule file with -l. It lists [files], [paths] and [directories] sections.",
                path.display()
            )
        }
        PathfinderError::ConfigRead { path, source, .. } => {
            anyhow!("Error opening list file '{}': {}", path.display(), source)
        }
        PathfinderError::ArchiveCreate { path, source } => {
            anyhow!(
                "Error creating zip archive '{}': {}\n\
                 HINT: Check that the output directory given with -p exists and is writable.",
                path.display(),
                source
            )
        }
        _ => anyhow::Error::from(err).context("Error collecting files"),
    }
}
