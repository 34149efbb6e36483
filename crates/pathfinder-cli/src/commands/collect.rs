//! Collect command implementation.

use crate::cli::Cli;
use crate::error::convert_pathfinder_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use pathfinder_core::CollectConfig;
use pathfinder_core::PathfinderError;
use pathfinder_core::RuleSet;
use pathfinder_core::collect;
use pathfinder_core::collection::archive::archive_path;
use pathfinder_core::generate_output_filename;
use pathfinder_core::parse_rules;
use std::path::Path;

pub fn execute(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let root = cli.root_dir();
    if !root.exists() {
        return Err(convert_pathfinder_error(PathfinderError::RootNotFound {
            path: root,
        }));
    }

    let rules = load_rules(&cli.list_file, formatter)?;

    let file_name = generate_output_filename(cli.output_name.as_deref());
    let output = archive_path(&cli.output_path, &file_name);

    let config = CollectConfig::default()
        .with_compression_level(cli.compression_level)
        .with_follow_symlinks(cli.follow_symlinks);

    let report = collect(&root, &rules, &output, &config).map_err(convert_pathfinder_error)?;

    formatter.format_run_result(&output, &report)
}

/// Parses the rule file, continuing with partial rules after a read error.
fn load_rules(path: &Path, formatter: &dyn OutputFormatter) -> Result<RuleSet> {
    match parse_rules(path) {
        Ok(rules) => Ok(rules),
        Err(PathfinderError::ConfigRead {
            path,
            source,
            partial: Some(rules),
        }) => {
            formatter.format_warning(&format!(
                "Error reading text file {}: {source} (continuing with {} rules)",
                path.display(),
                rules.len()
            ));
            Ok(*rules)
        }
        Err(e) => Err(convert_pathfinder_error(e)),
    }
}
