//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use pathfinder_core::RunReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct RunOutput {
    output_path: String,
    files_added: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    matched_by_name: usize,
    matched_by_path: usize,
    matched_by_directory: usize,
    directories_expanded: usize,
    duration_ms: u128,
    errors: Vec<String>,
}

impl RunOutput {
    fn new(output_path: &Path, report: &RunReport) -> Self {
        Self {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            matched_by_name: report.matched_by_name,
            matched_by_path: report.matched_by_path,
            matched_by_directory: report.matched_by_directory,
            directories_expanded: report.directories_expanded,
            duration_ms: report.duration.as_millis(),
            errors: report.errors.clone(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_run_result(&self, output_path: &Path, report: &RunReport) -> Result<()> {
        let output = JsonOutput::success("collect", RunOutput::new(output_path, report));
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("collect", format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        // Warnings go to stderr so stdout stays a single JSON document
        let _ = writeln!(io::stderr(), "warning: {message}");
    }
}
