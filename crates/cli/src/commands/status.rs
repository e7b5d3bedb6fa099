use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::fetch::{cache_path, load_cache};

/// Summarize the webmention cache for a site
pub async fn run(path: PathBuf) -> Result<()> {
    let cache_file = cache_path(&path);
    println!("Webmention cache: {}", cache_file.display());

    if !cache_file.exists() {
        println!("  No cache yet");
        println!("  Run 'mention-kit fetch {}' to create one", path.display());
        return Ok(());
    }

    let cache = load_cache(&cache_file);
    match cache.last_fetched {
        Some(last) => println!("  Last fetched: {}", last),
        None => println!("  Last fetched: never"),
    }
    println!("  Entries: {}", cache.children.len());

    let mut by_property: BTreeMap<&str, usize> = BTreeMap::new();
    let mut private = 0;
    for entry in &cache.children {
        *by_property.entry(entry.wm_property.as_str()).or_insert(0) += 1;
        if entry.wm_private {
            private += 1;
        }
    }

    for (property, count) in &by_property {
        let label = if property.is_empty() { "(unset)" } else { property };
        println!("    {}: {}", label, count);
    }
    if private > 0 {
        println!("  Private entries: {} (kept, filtered at render time)", private);
    }

    Ok(())
}
