//! Directory tree walking.
//!
//! Traversal is depth-first and pre-order: the root is yielded first, a
//! directory always comes before its descendants, and siblings are visited
//! in file name order so repeated runs see the same sequence. An unreadable directory
//! yields one error and its subtree is skipped; siblings are still visited.
//!
//! The root is reported exactly as given. Every descendant path is lexically
//! cleaned, so a root of `./data` yields `data/logs/app.log`.

use crate::PathfinderError;
use crate::collection::config::CollectConfig;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// One visited filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// The walk root as given, or a cleaned descendant path.
    pub path: PathBuf,

    /// Whether the entry is a directory.
    ///
    /// Without `follow_symlinks`, a symlink is never a directory.
    pub is_dir: bool,
}

impl WalkEntry {
    /// Base name of the entry, lossily converted to UTF-8.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Full path, lossily converted to UTF-8, for prefix matching.
    #[must_use]
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Walks a directory tree, yielding entries and per-subtree errors.
///
/// # Examples
///
/// ```no_run
/// use pathfinder_core::collection::CollectConfig;
/// use pathfinder_core::collection::walker::TreeWalker;
/// use std::path::Path;
///
/// let config = CollectConfig::default();
/// for entry in TreeWalker::new(Path::new("/var/log"), &config).walk() {
///     match entry {
///         Ok(entry) => println!("{}", entry.path.display()),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// ```
pub struct TreeWalker<'a> {
    root: &'a Path,
    config: &'a CollectConfig,
}

impl<'a> TreeWalker<'a> {
    /// Creates a walker rooted at `root`.
    #[must_use]
    pub fn new(root: &'a Path, config: &'a CollectConfig) -> Self {
        Self { root, config }
    }

    /// Returns an iterator over entries beneath (and including) the root.
    ///
    /// Errors are [`PathfinderError::Walk`] and never end the iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<WalkEntry, PathfinderError>> + '_ {
        WalkDir::new(self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .map(move |entry| match entry {
                Ok(entry) => {
                    let is_dir = entry.file_type().is_dir();
                    let path = if entry.depth() == 0 {
                        entry.into_path()
                    } else {
                        clean_path(entry.path())
                    };
                    Ok(WalkEntry { path, is_dir })
                }
                Err(e) => Err(walk_error(self.root, &e)),
            })
    }

    /// Iterates over the non-directory entries only.
    pub fn files(&self) -> impl Iterator<Item = Result<WalkEntry, PathfinderError>> + '_ {
        self.walk()
            .filter(|entry| !matches!(entry, Ok(WalkEntry { is_dir: true, .. })))
    }
}

/// Lexically normalizes a path without touching the filesystem.
///
/// `.` components and repeated separators are dropped, and `..` removes the
/// preceding normal component. A `..` directly under the root is dropped;
/// leading `..` components of a relative path are kept. An empty result is
/// `.`.
///
/// # Examples
///
/// ```
/// use pathfinder_core::collection::walker::clean_path;
/// use std::path::Path;
///
/// assert_eq!(clean_path(Path::new("./data/logs")), Path::new("data/logs"));
/// assert_eq!(clean_path(Path::new("/a/./b/../c")), Path::new("/a/c"));
/// assert_eq!(clean_path(Path::new("../x/y")), Path::new("../x/y"));
/// ```
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

fn walk_error(root: &Path, err: &walkdir::Error) -> PathfinderError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let reason = err.io_error().map_or_else(
        || err.to_string(),
        std::string::ToString::to_string,
    );
    PathfinderError::Walk { path, reason }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collect(root: &Path, config: &CollectConfig) -> Vec<WalkEntry> {
        TreeWalker::new(root, config)
            .walk()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_walk_includes_root_first() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("a.txt"), "a").unwrap();

        let entries = collect(root, &CollectConfig::default());
        assert_eq!(entries[0].path, root);
        assert!(entries[0].is_dir);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_directories_before_descendants() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("x/y")).unwrap();
        fs::write(root.join("x/y/z.txt"), "z").unwrap();

        let entries = collect(root, &CollectConfig::default());
        let pos = |p: &Path| entries.iter().position(|e| e.path == p).unwrap();

        assert!(pos(&root.join("x")) < pos(&root.join("x/y")));
        assert!(pos(&root.join("x/y")) < pos(&root.join("x/y/z.txt")));
    }

    #[test]
    fn test_siblings_in_name_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for name in ["c.txt", "a.txt", "b.txt"] {
            fs::write(root.join(name), name).unwrap();
        }

        let names: Vec<_> = collect(root, &CollectConfig::default())
            .iter()
            .skip(1)
            .map(WalkEntry::file_name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_files_skips_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/one.txt"), "1").unwrap();
        fs::write(root.join("two.txt"), "2").unwrap();

        let config = CollectConfig::default();
        let files: Vec<_> = TreeWalker::new(root, &config)
            .files()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|e| !e.is_dir));
    }

    #[test]
    fn test_walk_entry_names() {
        let entry = WalkEntry {
            path: PathBuf::from("/data/logs/app.log"),
            is_dir: false,
        };
        assert_eq!(entry.file_name(), "app.log");
        assert_eq!(entry.path_str(), "/data/logs/app.log");
    }

    #[test]
    fn test_missing_root_yields_error() {
        let config = CollectConfig::default();
        let results: Vec<_> = TreeWalker::new(Path::new("/nonexistent/walk/root"), &config)
            .walk()
            .collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(PathfinderError::Walk { .. })));
    }

    #[test]
    fn test_descendants_of_dotted_root_are_cleaned() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("sub/logs")).unwrap();
        fs::write(temp.path().join("sub/logs/app.log"), "x").unwrap();

        let root = temp.path().join(".").join("sub");
        let entries = collect(&root, &CollectConfig::default());

        assert_eq!(entries[0].path, root);
        assert!(entries[0].path_str().contains("/./"));
        let clean_root = temp.path().join("sub");
        assert_eq!(entries[1].path, clean_root.join("logs"));
        assert_eq!(entries[2].path, clean_root.join("logs/app.log"));
        assert!(entries[1..].iter().all(|e| !e.path_str().contains("/./")));
    }

    #[test]
    fn test_clean_path() {
        let cases = [
            ("data", "data"),
            ("./data/logs", "data/logs"),
            ("data/./logs/", "data/logs"),
            ("data//logs", "data/logs"),
            ("/a/b/../c", "/a/c"),
            ("/../a", "/a"),
            ("a/..", "."),
            ("../../a/b/..", "../../a"),
            (".", "."),
        ];
        for (input, expected) in cases {
            assert_eq!(clean_path(Path::new(input)), PathBuf::from(expected), "{input}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_dir_not_descended_by_default() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("real")).unwrap();
        fs::write(root.join("real/inside.txt"), "x").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

        let entries = collect(root, &CollectConfig::default());
        let link = entries.iter().find(|e| e.path == root.join("link")).unwrap();
        assert!(!link.is_dir);
        assert!(!entries.iter().any(|e| e.path == root.join("link/inside.txt")));

        let followed = collect(root, &CollectConfig::default().with_follow_symlinks(true));
        assert!(followed.iter().any(|e| e.path == root.join("link/inside.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_error_not_abort() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("dir1/dir2")).unwrap();
        std::os::unix::fs::symlink(root.join("dir1"), root.join("dir1/dir2/loop")).unwrap();
        fs::write(root.join("after.txt"), "still visited").unwrap();

        let config = CollectConfig::default().with_follow_symlinks(true);
        let results: Vec<_> = TreeWalker::new(root, &config).walk().collect();

        assert!(results.iter().any(Result::is_err));
        assert!(results
            .iter()
            .any(|r| matches!(r, Ok(e) if e.path == root.join("after.txt"))));
    }
}
