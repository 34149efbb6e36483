//! File collection module.
//!
//! Walks a source tree, applies a [`RuleSet`](crate::RuleSet) to every entry
//! and streams selected files into a flat ZIP archive.

pub mod archive;
pub mod config;
pub mod report;
pub mod selector;
pub mod walker;

// Re-exports for public API
pub use archive::ArchiveSession;
pub use config::CollectConfig;
pub use report::RunReport;
pub use selector::Selector;
pub use walker::TreeWalker;
pub use walker::WalkEntry;
