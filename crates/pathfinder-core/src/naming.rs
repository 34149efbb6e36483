//! Output archive naming.

use chrono::DateTime;
use chrono::Local;
use chrono::TimeZone;

/// Extension used for generated archive names.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Timestamp layout for generated names, e.g. `2024-Jan-02-15-04`.
const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H-%M";

/// Returns the archive file name for this run.
///
/// A non-empty `user_provided` name is returned verbatim; the caller is
/// responsible for its extension. Otherwise the name is generated from the
/// current local time at minute granularity, so two unnamed runs within the
/// same minute write to the same file.
///
/// # Examples
///
/// ```
/// use pathfinder_core::generate_output_filename;
///
/// assert_eq!(generate_output_filename(Some("bundle.zip")), "bundle.zip");
///
/// let generated = generate_output_filename(None);
/// assert!(generated.starts_with("request-"));
/// assert!(generated.ends_with(".zip"));
/// ```
#[must_use]
pub fn generate_output_filename(user_provided: Option<&str>) -> String {
    generate_output_filename_at(user_provided, &Local::now())
}

/// Same as [`generate_output_filename`] with an explicit timestamp.
#[must_use]
pub fn generate_output_filename_at<Tz>(user_provided: Option<&str>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match user_provided {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!(
            "request-{}.{ARCHIVE_EXTENSION}",
            now.format(TIMESTAMP_FORMAT)
        ),
    }
}
