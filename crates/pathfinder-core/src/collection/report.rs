//! Collection run reporting.

use crate::rules::RuleKind;
use std::time::Duration;

/// Report of a collection run.
///
/// Match counters count selections. A file selected by both a name rule and
/// a directory rule adds one to each counter and is written twice, so
/// `files_added` equals `total_matches()` minus the failed adds.
///
/// # Examples
///
/// ```
/// use pathfinder_core::RuleKind;
/// use pathfinder_core::collection::RunReport;
///
/// let mut report = RunReport::default();
/// report.record_match(RuleKind::Name);
/// report.record_match(RuleKind::Directory);
///
/// assert_eq!(report.total_matches(), 2);
/// assert_eq!(report.matched_by_name, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Number of entries written to the archive.
    pub files_added: usize,

    /// Total source bytes copied into the archive (uncompressed).
    pub bytes_written: u64,

    /// Size of the finished archive file.
    pub bytes_compressed: u64,

    /// Files selected by a `[files]` rule.
    pub matched_by_name: usize,

    /// Files selected by a `[paths]` rule.
    pub matched_by_path: usize,

    /// Files selected through a `[directories]` sub-walk.
    pub matched_by_directory: usize,

    /// Directories whose path matched a `[directories]` rule.
    pub directories_expanded: usize,

    /// Duration of the run.
    pub duration: Duration,

    /// One message per recoverable failure.
    pub errors: Vec<String>,
}

impl RunReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one selection of the given kind.
    pub fn record_match(&mut self, kind: RuleKind) {
        match kind {
            RuleKind::Name => self.matched_by_name += 1,
            RuleKind::Path => self.matched_by_path += 1,
            RuleKind::Directory => self.matched_by_directory += 1,
        }
    }

    /// Total selections across all rule kinds.
    #[must_use]
    pub fn total_matches(&self) -> usize {
        self.matched_by_name + self.matched_by_path + self.matched_by_directory
    }

    /// Records a recoverable failure.
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Returns whether any recoverable failure happened.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the compression percentage (space saved).
    ///
    /// Returns 0.0 if nothing was written or the archive is larger than its
    /// content (small files pay for headers).
    ///
    /// # Examples
    ///
    /// ```
    /// use pathfinder_core::collection::RunReport;
    ///
    /// let mut report = RunReport::new();
    /// report.bytes_written = 1000;
    /// report.bytes_compressed = 250;
    /// assert_eq!(report.compression_percentage(), 75.0);
    ///
    /// report.bytes_compressed = 4000;
    /// assert_eq!(report.compression_percentage(), 0.0);
    /// ```
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        let saved = self.bytes_written.saturating_sub(self.bytes_compressed);
        (saved as f64 / self.bytes_written as f64) * 100.0
    }
}
