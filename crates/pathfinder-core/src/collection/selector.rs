//! Rule evaluation over a directory walk.
//!
//! Every walked entry is checked against all three rule kinds, in the order
//! name, path, directory. The checks are independent, so one file can be
//! selected several times, and every selection becomes its own archive
//! entry. Entries are written in the order selections happen.

use crate::PathfinderError;
use crate::Result;
use crate::collection::archive::ArchiveSession;
use crate::collection::config::CollectConfig;
use crate::collection::report::RunReport;
use crate::collection::walker::TreeWalker;
use crate::collection::walker::WalkEntry;
use crate::rules::RuleKind;
use crate::rules::RuleSet;
use std::io::Seek;
use std::io::Write;
use std::path::Path;

/// Applies a [`RuleSet`] to a directory tree and feeds matches to an archive.
///
/// # Examples
///
/// ```
/// use pathfinder_core::RuleSet;
/// use pathfinder_core::collection::ArchiveSession;
/// use pathfinder_core::collection::CollectConfig;
/// use pathfinder_core::collection::RunReport;
/// use pathfinder_core::collection::Selector;
/// use std::io::Cursor;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let temp = tempfile::tempdir()?;
/// std::fs::write(temp.path().join("config.json"), "{}")?;
///
/// let mut rules = RuleSet::new();
/// rules.names.push("config.json".to_string());
///
/// let config = CollectConfig::default();
/// let mut archive = ArchiveSession::new(Cursor::new(Vec::new()), &config);
/// let mut report = RunReport::new();
/// Selector::new(&rules, &config).run(temp.path(), &mut archive, &mut report)?;
///
/// assert_eq!(report.files_added, 1);
/// # Ok(())
/// # }
/// ```
pub struct Selector<'a> {
    rules: &'a RuleSet,
    config: &'a CollectConfig,
}

impl<'a> Selector<'a> {
    /// Creates a selector for the given rules.
    #[must_use]
    pub fn new(rules: &'a RuleSet, config: &'a CollectConfig) -> Self {
        Self { rules, config }
    }

    /// Walks `root` and adds every selected file to `archive`.
    ///
    /// Per-file and per-subtree failures are logged, recorded in `report`,
    /// and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PathfinderError::RootNotFound`] if `root` does not exist.
    pub fn run<W: Write + Seek>(
        &self,
        root: &Path,
        archive: &mut ArchiveSession<W>,
        report: &mut RunReport,
    ) -> Result<()> {
        if !root.exists() {
            return Err(PathfinderError::RootNotFound {
                path: root.to_path_buf(),
            });
        }

        for entry in TreeWalker::new(root, self.config).walk() {
            match entry {
                Ok(entry) => self.evaluate(&entry, archive, report),
                Err(e) => record_error(report, &e),
            }
        }

        Ok(())
    }

    /// Runs the three rule checks on one entry.
    fn evaluate<W: Write + Seek>(
        &self,
        entry: &WalkEntry,
        archive: &mut ArchiveSession<W>,
        report: &mut RunReport,
    ) {
        if entry.is_dir {
            self.check_directory(entry, archive, report);
            return;
        }

        if self.rules.matches_name(&entry.file_name()) {
            log::info!("Found by name: {}", entry.path.display());
            select(entry.path.as_path(), RuleKind::Name, archive, report);
        }

        if let Some(prefix) = self.rules.first_path_prefix(&entry.path_str()) {
            log::info!("Found by path: {}", entry.path.display());
            log::debug!("{} matched path prefix '{prefix}'", entry.path.display());
            select(entry.path.as_path(), RuleKind::Path, archive, report);
        }
    }

    /// Expands a directory matching a `[directories]` rule.
    ///
    /// The sub-walk is independent of the outer walk, so files beneath are
    /// also evaluated again by the outer walk, and nested directories that
    /// match expand again.
    fn check_directory<W: Write + Seek>(
        &self,
        entry: &WalkEntry,
        archive: &mut ArchiveSession<W>,
        report: &mut RunReport,
    ) {
        let Some(prefix) = self.rules.first_dir_prefix(&entry.path_str()) else {
            return;
        };

        log::info!("Found under directory: {}", entry.path.display());
        log::debug!("{} matched directory prefix '{prefix}'", entry.path.display());
        report.directories_expanded += 1;

        for file in TreeWalker::new(&entry.path, self.config).files() {
            match file {
                Ok(file) => select(&file.path, RuleKind::Directory, archive, report),
                Err(e) => record_error(report, &e),
            }
        }
    }
}

/// Offers one selected file to the archive.
fn select<W: Write + Seek>(
    path: &Path,
    kind: RuleKind,
    archive: &mut ArchiveSession<W>,
    report: &mut RunReport,
) {
    report.record_match(kind);

    match archive.add_file(path) {
        Ok(bytes) => {
            log::debug!("added {} ({bytes} bytes) by {kind} rule", path.display());
            report.files_added += 1;
            report.bytes_written += bytes;
        }
        Err(e) => {
            log::error!("Error adding file to archive: {e}");
            report.add_error(e.to_string());
        }
    }
}

fn record_error(report: &mut RunReport, err: &PathfinderError) {
    log::warn!("{err}");
    report.add_error(err.to_string());
}
