//! Error types for rule parsing, selection, and archive writing.

use crate::rules::RuleSet;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PathfinderError`.
pub type Result<T> = std::result::Result<T, PathfinderError>;

/// Errors that can occur while collecting files into an archive.
#[derive(Error, Debug)]
pub enum PathfinderError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Root directory to scan does not exist.
    #[error("root directory does not exist: {path}")]
    RootNotFound {
        /// The missing root.
        path: PathBuf,
    },

    /// Rule config file does not exist.
    #[error("rule file does not exist: {path}")]
    ConfigNotFound {
        /// The missing config file.
        path: PathBuf,
    },

    /// Rule config file could not be opened or read to the end.
    ///
    /// When the failure happened mid-scan, `partial` holds every rule
    /// collected before it.
    #[error("cannot read rule file {path}: {source}")]
    ConfigRead {
        /// The config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
        /// Rules parsed before the failure, if any line was read.
        partial: Option<Box<RuleSet>>,
    },

    /// Output archive file could not be created.
    #[error("cannot create archive {path}: {source}")]
    ArchiveCreate {
        /// The archive path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Source file could not be opened for reading.
    #[error("failed to open source file {path}: {source}")]
    SourceOpen {
        /// The source file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An archive entry could not be started or completed.
    #[error("failed to create entry '{name}' in archive: {reason}")]
    EntryCreate {
        /// Entry name.
        name: String,
        /// Reason reported by the archive writer.
        reason: String,
    },

    /// Copying file content into the archive failed.
    #[error("failed to copy {path} into archive: {source}")]
    Copy {
        /// The source file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Directory traversal failed for one subtree.
    #[error("error walking {path}: {reason}")]
    Walk {
        /// Path where traversal failed.
        path: PathBuf,
        /// Reason reported by the walker.
        reason: String,
    },

    /// Archive central directory could not be written.
    ///
    /// Entries are already on disk at this point, so a run reports this
    /// instead of failing.
    #[error("failed to finish archive: {0}")]
    ArchiveFinish(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_root_not_found_display() {
        let err = PathfinderError::RootNotFound {
            path: PathBuf::from("/no/such/dir"),
        };
        assert_eq!(err.to_string(), "root directory does not exist: /no/such/dir");
    }

    #[test]
    fn test_config_read_display_omits_partial_rules() {
        let err = PathfinderError::ConfigRead {
            path: PathBuf::from("rules.txt"),
            source: io::Error::other("disk vanished"),
            partial: Some(Box::default()),
        };
        assert_eq!(err.to_string(), "cannot read rule file rules.txt: disk vanished");
    }

    #[test]
    fn test_per_file_errors_name_the_path() {
        let err = PathfinderError::SourceOpen {
            path: PathBuf::from("/data/secret.key"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/data/secret.key"));

        let err = PathfinderError::Walk {
            path: PathBuf::from("/data/locked"),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("/data/locked"));
    }

    #[test]
    fn test_entry_create_names_entry() {
        let err = PathfinderError::EntryCreate {
            name: "app.log".to_string(),
            reason: "file larger than 4 GiB".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to create entry 'app.log' in archive: file larger than 4 GiB"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: PathfinderError = io_err.into();
        assert!(matches!(err, PathfinderError::Io(_)));
    }
}
