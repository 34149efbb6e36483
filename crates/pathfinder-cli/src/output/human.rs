//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use pathfinder_core::RunReport;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_run_result(&self, output_path: &Path, report: &RunReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        // The summary is verbose-only; a default run prints nothing on success
        if self.verbose {
            if self.use_colors {
                let _ = self.term.write_line(&format!(
                    "{} New zip archive created: {}",
                    style("✓").green().bold(),
                    output_path.display()
                ));
            } else {
                let _ = self
                    .term
                    .write_line(&format!("New zip archive created: {}", output_path.display()));
            }

            let _ = self.term.write_line(&format!(
                "  Files added:      {}",
                Self::format_number(report.files_added)
            ));
            let _ = self.term.write_line(&format!(
                "  Total size:       {}",
                Self::format_size(report.bytes_written)
            ));
            let _ = self.term.write_line(&format!(
                "  Matched by name:  {}",
                Self::format_number(report.matched_by_name)
            ));
            let _ = self.term.write_line(&format!(
                "  Matched by path:  {}",
                Self::format_number(report.matched_by_path)
            ));
            let _ = self.term.write_line(&format!(
                "  Under directory:  {}",
                Self::format_number(report.matched_by_directory)
            ));
            let _ = self.term.write_line(&format!(
                "  Archive size:     {} ({:.1}% saved)",
                Self::format_size(report.bytes_compressed),
                report.compression_percentage()
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }

        if report.has_errors() {
            let _ = self.term.write_line("");
            if self.use_colors {
                let _ = self.term.write_line(&format!(
                    "{} {} file(s) could not be added",
                    style("⚠").yellow().bold(),
                    report.errors.len()
                ));
            } else {
                let _ = self.term.write_line(&format!(
                    "WARNING: {} file(s) could not be added",
                    report.errors.len()
                ));
            }
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("Error:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("Error: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
