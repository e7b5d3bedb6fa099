use anyhow::{Context, Result};
use mention_kit_core::headings::extract_headings;
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

const MAX_SCAN_DEPTH: usize = 4; // Maximum directory depth for markdown scanning

/// Print the heading outline of every markdown file under a directory
pub async fn run(path: PathBuf) -> Result<()> {
    println!("📑 Scanning {} for markdown files...", path.display());

    if !path.exists() {
        anyhow::bail!("Content directory does not exist: {}", path.display());
    }

    let mut files = 0;
    let mut total_headings = 0;

    for entry in WalkDir::new(&path)
        .max_depth(MAX_SCAN_DEPTH)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }

        let contents = fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        let headings = extract_headings(&contents);
        if headings.is_empty() {
            continue;
        }

        println!();
        println!("{}", entry.path().display());
        for heading in &headings {
            let indent = "  ".repeat(heading.depth.saturating_sub(1) as usize);
            println!("   {}{} (#{})", indent, heading.text, heading.slug);
        }

        files += 1;
        total_headings += headings.len();
    }

    println!();
    println!("✓ {} headings across {} files", total_headings, files);

    Ok(())
}
