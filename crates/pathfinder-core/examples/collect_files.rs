//! Example: Collecting files with pathfinder-core
//!
//! Run with: `cargo run --example collect_files`

use pathfinder_core::CollectConfig;
use pathfinder_core::collect;
use pathfinder_core::rules::parse_rules_from_reader;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build a small source tree to scan
    let root = std::env::temp_dir().join("pathfinder-example");
    std::fs::create_dir_all(root.join("logs"))?;
    std::fs::create_dir_all(root.join("cache/nested"))?;
    std::fs::write(root.join("config.json"), "{}")?;
    std::fs::write(root.join("logs/app.log"), "started\n")?;
    std::fs::write(root.join("cache/nested/blob.bin"), [0u8; 64])?;

    let rule_text = format!(
        "[files]\nconfig.json\n[paths]\n{}\n[directories]\n{}\n",
        root.join("logs").display(),
        root.join("cache").display()
    );
    let parsed = parse_rules_from_reader(rule_text.as_bytes());
    println!("Parsed {} rules", parsed.rules.len());

    let report = collect(&root, &parsed.rules, "example.zip", &CollectConfig::default())?;
    println!("  Files added:      {}", report.files_added);
    println!("  Matched by name:  {}", report.matched_by_name);
    println!("  Matched by path:  {}", report.matched_by_path);
    println!("  Under directory:  {}", report.matched_by_directory);

    // Cleanup
    std::fs::remove_file("example.zip")?;
    std::fs::remove_dir_all(&root)?;

    Ok(())
}
