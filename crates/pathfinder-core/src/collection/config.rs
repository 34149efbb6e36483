//! Configuration for a collection run.

/// Configuration for walking the source tree and writing the archive.
///
/// # Examples
///
/// ```
/// use pathfinder_core::collection::CollectConfig;
///
/// let config = CollectConfig::default()
///     .with_compression_level(Some(9))
///     .with_follow_symlinks(true);
/// assert_eq!(config.compression_level, Some(9));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectConfig {
    /// Deflate level for archive entries.
    ///
    /// `Some(0)` stores entries uncompressed, `Some(1..=9)` selects a deflate
    /// level, and `None` uses the deflate default (level 6).
    ///
    /// Default: `None`.
    pub compression_level: Option<u8>,

    /// Follow symlinks while walking.
    ///
    /// When `false`, a symlink to a directory is treated as a non-directory
    /// entry and is not descended into.
    ///
    /// Default: `false`.
    pub follow_symlinks: bool,
}

impl CollectConfig {
    /// Creates a new `CollectConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    #[must_use]
    pub fn with_compression_level(mut self, level: Option<u8>) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets whether to follow symlinks.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}
