//! Rule file parsing and matching.
//!
//! A rule file is line oriented. Bracketed headers select a section and every
//! other line is taken verbatim as a rule for the current section:
//!
//! ```text
//! [files]
//! config.json
//! [paths]
//! /data/logs
//! [directories]
//! /data/cache
//! ```
//!
//! Lines before the first header, lines under an unknown header, and lines
//! under an empty `[]` header are discarded.

use crate::PathfinderError;
use crate::Result;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

/// Which criterion selected an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Exact base name match from `[files]`.
    Name,
    /// Full path prefix match from `[paths]`.
    Path,
    /// Directory path prefix match from `[directories]`.
    Directory,
}

impl RuleKind {
    /// Maps a section header name to the rule kind it populates.
    ///
    /// Section names are case-sensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathfinder_core::RuleKind;
    ///
    /// assert_eq!(RuleKind::from_section("files"), Some(RuleKind::Name));
    /// assert_eq!(RuleKind::from_section("Files"), None);
    /// assert_eq!(RuleKind::from_section(""), None);
    /// ```
    #[must_use]
    pub fn from_section(section: &str) -> Option<Self> {
        match section {
            "files" => Some(Self::Name),
            "paths" => Some(Self::Path),
            "directories" => Some(Self::Directory),
            _ => None,
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Path => write!(f, "path"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// The three match-criteria lists parsed from a rule file.
///
/// Insertion order is kept. It only matters for path prefixes, which are
/// tested in order and stop at the first hit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// Exact base names.
    pub names: Vec<String>,

    /// Prefixes tested against the full walked path of files.
    pub path_prefixes: Vec<String>,

    /// Prefixes tested against directory paths.
    pub dir_prefixes: Vec<String>,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule to the list for `kind`.
    pub fn push(&mut self, kind: RuleKind, rule: impl Into<String>) {
        self.rules_mut(kind).push(rule.into());
    }

    /// Returns the rules of one kind, in insertion order.
    #[must_use]
    pub fn rules(&self, kind: RuleKind) -> &[String] {
        match kind {
            RuleKind::Name => &self.names,
            RuleKind::Path => &self.path_prefixes,
            RuleKind::Directory => &self.dir_prefixes,
        }
    }

    fn rules_mut(&mut self, kind: RuleKind) -> &mut Vec<String> {
        match kind {
            RuleKind::Name => &mut self.names,
            RuleKind::Path => &mut self.path_prefixes,
            RuleKind::Directory => &mut self.dir_prefixes,
        }
    }

    /// Total number of rules across all three lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len() + self.path_prefixes.len() + self.dir_prefixes.len()
    }

    /// Returns `true` if no rule of any kind is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `file_name` equals one of the name rules.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathfinder_core::RuleSet;
    ///
    /// let mut rules = RuleSet::new();
    /// rules.names.push("config.json".to_string());
    ///
    /// assert!(rules.matches_name("config.json"));
    /// assert!(!rules.matches_name("config.json.bak"));
    /// ```
    #[must_use]
    pub fn matches_name(&self, file_name: &str) -> bool {
        self.names.iter().any(|name| name == file_name)
    }

    /// Returns the first path prefix that `path` starts with.
    ///
    /// This is plain string comparison: `/data/log` is a prefix of
    /// `/data/logs/app.log`.
    #[must_use]
    pub fn first_path_prefix(&self, path: &str) -> Option<&str> {
        self.path_prefixes
            .iter()
            .find(|prefix| path.starts_with(prefix.as_str()))
            .map(String::as_str)
    }

    /// Returns the first directory prefix that `dir` starts with.
    #[must_use]
    pub fn first_dir_prefix(&self, dir: &str) -> Option<&str> {
        self.dir_prefixes
            .iter()
            .find(|prefix| dir.starts_with(prefix.as_str()))
            .map(String::as_str)
    }
}

/// Outcome of parsing rules from a reader.
///
/// A read failure stops parsing but keeps every rule seen before it.
#[derive(Debug)]
pub struct ParsedRules {
    /// Rules collected up to the end of input or the first read error.
    pub rules: RuleSet,

    /// The read error that stopped parsing, if any.
    pub error: Option<std::io::Error>,

    /// Number of lines consumed, headers included.
    pub lines_read: usize,
}

/// Returns the section name if `line` is a `[section]` header.
fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']')
}

/// Parses rules from any buffered reader.
///
/// # Examples
///
/// ```
/// use pathfinder_core::rules::parse_rules_from_reader;
///
/// let input = "[files]\nconfig.json\n[paths]\n/data/logs\n";
/// let parsed = parse_rules_from_reader(input.as_bytes());
///
/// assert!(parsed.error.is_none());
/// assert_eq!(parsed.rules.names, vec!["config.json"]);
/// assert_eq!(parsed.rules.path_prefixes, vec!["/data/logs"]);
/// ```
pub fn parse_rules_from_reader<R: BufRead>(mut reader: R) -> ParsedRules {
    let mut rules = RuleSet::new();
    let mut current: Option<RuleKind> = None;
    let mut lines_read = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                return ParsedRules {
                    rules,
                    error: Some(e),
                    lines_read,
                };
            }
        }
        lines_read += 1;

        let line = decode_line(&buf);

        if let Some(section) = section_header(&line) {
            current = RuleKind::from_section(section);
            if current.is_none() {
                log::debug!("ignoring lines under unknown section [{section}]");
            }
            continue;
        }

        if let Some(kind) = current {
            rules.push(kind, line);
        }
    }

    ParsedRules {
        rules,
        error: None,
        lines_read,
    }
}

/// Strips the line terminator (`\n` or `\r\n`) and decodes the rest.
///
/// Bytes that are not valid UTF-8 become U+FFFD, the same substitution
/// walked paths get before matching.
fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Reads and parses a rule file.
///
/// # Errors
///
/// - [`PathfinderError::ConfigNotFound`] if `path` does not exist.
/// - [`PathfinderError::ConfigRead`] if the file cannot be opened, or a read
///   fails part way. In the second case `partial` holds the rules parsed
///   before the failure. Undecodable bytes are not a read failure.
///
/// # Examples
///
/// ```no_run
/// use pathfinder_core::parse_rules;
///
/// let rules = parse_rules("pathfinder.txt")?;
/// println!("{} rules", rules.len());
/// # Ok::<(), pathfinder_core::PathfinderError>(())
/// ```
pub fn parse_rules<P: AsRef<Path>>(path: P) -> Result<RuleSet> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PathfinderError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| PathfinderError::ConfigRead {
        path: path.to_path_buf(),
        source,
        partial: None,
    })?;

    let parsed = parse_rules_from_reader(BufReader::new(file));
    match parsed.error {
        None => {
            log::debug!(
                "parsed {} rules from {} ({} lines)",
                parsed.rules.len(),
                path.display(),
                parsed.lines_read
            );
            Ok(parsed.rules)
        }
        Some(source) => Err(PathfinderError::ConfigRead {
            path: path.to_path_buf(),
            source,
            partial: Some(Box::new(parsed.rules)),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::io::Read;
    use tempfile::TempDir;

    fn parse(input: &str) -> RuleSet {
        let parsed = parse_rules_from_reader(input.as_bytes());
        assert!(parsed.error.is_none());
        parsed.rules
    }

    #[test]
    fn test_parse_all_sections() {
        let rules = parse("[files]\nconfig.json\n[paths]\n/data/logs\n[directories]\n/data/cache");

        assert_eq!(rules.names, vec!["config.json"]);
        assert_eq!(rules.path_prefixes, vec!["/data/logs"]);
        assert_eq!(rules.dir_prefixes, vec!["/data/cache"]);
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_lines_before_header_discarded() {
        let rules = parse("orphan\nanother\n[files]\nkept");
        assert_eq!(rules.names, vec!["kept"]);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_unknown_section_discards_lines() {
        let rules = parse("[files]\na\n[misc]\nb\nc\n[files]\nd");
        assert_eq!(rules.names, vec!["a", "d"]);
        assert!(rules.path_prefixes.is_empty());
        assert!(rules.dir_prefixes.is_empty());
    }

    #[test]
    fn test_empty_brackets_is_empty_section() {
        let rules = parse("[paths]\n/a\n[]\n/b\n[paths]\n/c");
        assert_eq!(rules.path_prefixes, vec!["/a", "/c"]);
    }

    #[test]
    fn test_sections_repeat_and_accumulate() {
        let rules = parse("[directories]\n/x\n[files]\nf\n[directories]\n/y");
        assert_eq!(rules.dir_prefixes, vec!["/x", "/y"]);
        assert_eq!(rules.names, vec!["f"]);
    }

    #[test]
    fn test_lines_kept_verbatim() {
        let rules = parse("[files]\n  spaced name  \n\n[paths]\n");
        assert_eq!(rules.names, vec!["  spaced name  ", ""]);
        assert!(rules.path_prefixes.is_empty());
    }

    #[test]
    fn test_blank_line_in_unknown_section_dropped() {
        let rules = parse("[other]\n\n\n[files]\n\n");
        assert_eq!(rules.names, vec![""]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let rules = parse("[files]\r\nconfig.json\r\n[paths]\r\n/data\r\n");
        assert_eq!(rules.names, vec!["config.json"]);
        assert_eq!(rules.path_prefixes, vec!["/data"]);
    }

    #[test]
    fn test_section_names_case_sensitive() {
        let rules = parse("[FILES]\nupper\n[Files]\nmixed");
        assert!(rules.is_empty());
    }

    #[test]
    fn test_header_must_close_on_same_line() {
        // "[files" is not a header, so it is a rule under the current section
        let rules = parse("[files]\n[files\nfiles]");
        assert_eq!(rules.names, vec!["[files", "files]"]);
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse_rules_from_reader(io::empty());
        assert!(parsed.error.is_none());
        assert!(parsed.rules.is_empty());
        assert_eq!(parsed.lines_read, 0);
    }

    /// Reader that yields a prefix then fails.
    struct FailingReader {
        data: io::Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::other("disk vanished"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_keeps_partial_rules() {
        let reader = io::BufReader::new(FailingReader {
            data: io::Cursor::new(b"[files]\na\nb\n".to_vec()),
        });

        let parsed = parse_rules_from_reader(reader);
        assert!(parsed.error.is_some());
        assert_eq!(parsed.rules.names, vec!["a", "b"]);
        assert_eq!(parsed.lines_read, 3);
    }

    #[test]
    fn test_parse_rules_missing_file() {
        let result = parse_rules("/nonexistent/pathfinder.txt");
        assert!(matches!(
            result.unwrap_err(),
            PathfinderError::ConfigNotFound { .. }
        ));
    }

    #[test]
    fn test_parse_rules_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pathfinder.txt");
        fs::write(&path, "[files]\nid_rsa\n[directories]\n/etc/ssh\n").unwrap();

        let rules = parse_rules(&path).unwrap();
        assert_eq!(rules.names, vec!["id_rsa"]);
        assert_eq!(rules.dir_prefixes, vec!["/etc/ssh"]);
    }

    #[test]
    fn test_invalid_utf8_line_kept_and_parsing_continues() {
        let parsed = parse_rules_from_reader(&b"[files]\ncaf\xe9.txt\nid_rsa\n"[..]);
        assert!(parsed.error.is_none());
        assert_eq!(parsed.rules.names, vec!["caf\u{FFFD}.txt", "id_rsa"]);
        assert_eq!(parsed.lines_read, 3);
    }

    #[test]
    fn test_parse_rules_file_with_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pathfinder.txt");
        let mut content = b"[files]\ngood\n".to_vec();
        content.extend_from_slice(&[0xff, 0xfe, b'\n']);
        content.extend_from_slice(b"[paths]\n/srv\n");
        fs::write(&path, content).unwrap();

        let rules = parse_rules(&path).unwrap();
        assert_eq!(rules.names, vec!["good", "\u{FFFD}\u{FFFD}"]);
        assert_eq!(rules.path_prefixes, vec!["/srv"]);
    }

    #[test]
    fn test_last_line_without_newline() {
        let rules = parse("[files]\nlast");
        assert_eq!(rules.names, vec!["last"]);
    }

    #[test]
    fn test_lone_carriage_return_kept_inside_line() {
        let rules = parse("[files]\na\rb\r\n");
        assert_eq!(rules.names, vec!["a\rb"]);
    }

    #[test]
    fn test_first_path_prefix_short_circuits() {
        let mut rules = RuleSet::new();
        rules.push(RuleKind::Path, "/data");
        rules.push(RuleKind::Path, "/data/logs");

        assert_eq!(rules.first_path_prefix("/data/logs/app.log"), Some("/data"));
        assert_eq!(rules.first_path_prefix("/srv/app.log"), None);
    }

    #[test]
    fn test_prefix_is_string_prefix_not_component() {
        let mut rules = RuleSet::new();
        rules.push(RuleKind::Directory, "/data/ca");

        assert_eq!(rules.first_dir_prefix("/data/cache"), Some("/data/ca"));
        assert_eq!(rules.first_dir_prefix("/data"), None);
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        let rules = parse("[paths]\n\n");
        assert_eq!(rules.first_path_prefix("/anything"), Some(""));
    }

    #[test]
    fn test_rule_kind_display() {
        assert_eq!(RuleKind::Name.to_string(), "name");
        assert_eq!(RuleKind::Path.to_string(), "path");
        assert_eq!(RuleKind::Directory.to_string(), "directory");
    }
}
