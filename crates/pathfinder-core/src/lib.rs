//! Rule-driven file selection and ZIP bundling.
//!
//! `pathfinder-core` reads a sectioned rule file listing exact file names,
//! path prefixes, and directory prefixes, walks a directory tree once, and
//! writes every matching file into a single flat ZIP archive.
//!
//! # Examples
//!
//! ```no_run
//! use pathfinder_core::collect;
//! use pathfinder_core::collection::CollectConfig;
//! use pathfinder_core::generate_output_filename;
//! use pathfinder_core::parse_rules;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = parse_rules("pathfinder.txt")?;
//! let output = generate_output_filename(None);
//! let report = collect("/srv/app", &rules, &output, &CollectConfig::default())?;
//! println!("Collected {} files into {output}", report.files_added);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod collection;
pub mod error;
pub mod naming;
pub mod rules;

// Re-export main API types
pub use api::collect;
pub use collection::CollectConfig;
pub use collection::RunReport;
pub use error::PathfinderError;
pub use error::Result;
pub use naming::generate_output_filename;
pub use naming::generate_output_filename_at;
pub use rules::RuleKind;
pub use rules::RuleSet;
pub use rules::parse_rules;
