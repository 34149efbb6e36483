//! High-level public API for collecting files into an archive.

use std::fs;
use std::fs::File;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crate::PathfinderError;
use crate::Result;
use crate::RuleSet;
use crate::collection::ArchiveSession;
use crate::collection::CollectConfig;
use crate::collection::RunReport;
use crate::collection::Selector;

/// Walks `root`, selects files by `rules`, and writes them to `output`.
///
/// The root is checked before the archive file is created, so a missing
/// root leaves no file behind. Once the archive exists, per-file failures
/// and a failure to write the central directory only show up in the report.
///
/// # Errors
///
/// Returns an error if:
/// - `root` does not exist ([`PathfinderError::RootNotFound`])
/// - the archive file cannot be created ([`PathfinderError::ArchiveCreate`])
///
/// # Examples
///
/// ```no_run
/// use pathfinder_core::collect;
/// use pathfinder_core::collection::CollectConfig;
/// use pathfinder_core::parse_rules;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let rules = parse_rules("pathfinder.txt")?;
/// let report = collect("/srv", &rules, "bundle.zip", &CollectConfig::default())?;
/// println!("Added {} files", report.files_added);
/// # Ok(())
/// # }
/// ```
pub fn collect<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    rules: &RuleSet,
    output: Q,
    config: &CollectConfig,
) -> Result<RunReport> {
    let root = root.as_ref();
    let output = output.as_ref();

    check_root(root)?;
    let file = File::create(output).map_err(|source| PathfinderError::ArchiveCreate {
        path: output.to_path_buf(),
        source,
    })?;

    // The file handle is closed inside, after the archive writer is done.
    let mut report = collect_to_writer(root, rules, file, config)?;
    report.bytes_compressed = fs::metadata(output).map(|m| m.len()).unwrap_or_default();

    log::debug!(
        "wrote {} entries to {} in {:?}",
        report.files_added,
        output.display(),
        report.duration
    );

    Ok(report)
}

/// Same as [`collect`], writing the archive into any seekable sink.
///
/// The sink is dropped before returning.
///
/// # Errors
///
/// Returns [`PathfinderError::RootNotFound`] if `root` does not exist.
///
/// # Examples
///
/// ```
/// use pathfinder_core::RuleSet;
/// use pathfinder_core::api::collect_to_writer;
/// use pathfinder_core::collection::CollectConfig;
/// use std::io::Cursor;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let temp = tempfile::tempdir()?;
/// let report = collect_to_writer(
///     temp.path(),
///     &RuleSet::new(),
///     Cursor::new(Vec::new()),
///     &CollectConfig::default(),
/// )?;
/// assert_eq!(report.files_added, 0);
/// # Ok(())
/// # }
/// ```
pub fn collect_to_writer<W: Write + Seek>(
    root: &Path,
    rules: &RuleSet,
    sink: W,
    config: &CollectConfig,
) -> Result<RunReport> {
    let start = Instant::now();
    check_root(root)?;

    let mut report = RunReport::new();
    let mut archive = ArchiveSession::new(sink, config);
    Selector::new(rules, config).run(root, &mut archive, &mut report)?;

    // Writer first, then the sink it returns.
    match archive.finish() {
        Ok(sink) => drop(sink),
        Err(e) => {
            log::error!("Error closing zip archive: {e}");
            report.add_error(e.to_string());
        }
    }

    report.duration = start.elapsed();
    Ok(report)
}

fn check_root(root: &Path) -> Result<()> {
    if root.exists() {
        Ok(())
    } else {
        Err(PathfinderError::RootNotFound {
            path: root.to_path_buf(),
        })
    }
}
