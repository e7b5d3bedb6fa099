use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Starter site.toml written by `mention-kit init`.
///
/// Kept as a literal template rather than serialized from SiteConfig:
/// the comments and section ordering are the point, and the toml crate's
/// serialization preserves neither.
fn starter_site_toml() -> &'static str {
    r##"# Site configuration for mention-kit

[site]
author = "Your Name"
title = "My Blog"
description = "Notes and longer posts"
lang = "en-GB"
og_locale = "en_GB"
home_page_slug = "home"

# Optional: how templates render dates. Defaults to the site language
# and "%-d %B %Y" when omitted.
# [site.date]
# locale = "en-GB"
# format = "%-d %B %Y"

# Optional: endpoints advertised in <link rel="webmention"> tags.
# Required before 'mention-kit fetch' can do anything. The account
# domain is the first path segment of the link.
# [webmentions]
# link = "https://webmention.io/example.com/webmention"
# pingback = "https://webmention.io/example.com/xmlrpc"

# Optional: site logo, either a file shipped with the site or an emoji.
# [logo]
# path = "assets/logo.png"
# emoji = "🌱"

# Profiles listed in the site footer. Set is_webmention on the ones
# that should count as webmention sources.
# [[social]]
# name = "mastodon"
# friendly_name = "Mastodon"
# link = "https://indieweb.social/@example"
# is_webmention = true
"##
}

/// Scaffold a new site directory with a commented starter site.toml
pub async fn run(path: PathBuf) -> Result<()> {
    println!("🌱 Initializing site directory...");
    println!("   Path: {}", path.display());
    println!();

    let config_path = path.join("site.toml");
    if config_path.exists() {
        anyhow::bail!("site.toml already exists in {}", path.display());
    }

    fs::create_dir_all(path.join("content")).context("Failed to create content directory")?;
    fs::create_dir_all(path.join("data")).context("Failed to create data directory")?;
    fs::write(&config_path, starter_site_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("✅ Site initialized!");
    println!("   Config:  {}", config_path.display());
    println!("   Content: {}", path.join("content").display());
    println!("   Cache:   {}", path.join("data").display());
    println!();
    println!("Next steps:");
    println!("   1. Edit {} (author, title, endpoints)", config_path.display());
    println!("   2. Uncomment the [webmentions] section");
    println!("   3. Export WEBMENTION_API_KEY and run 'mention-kit fetch {}'", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mention_kit_core::config::parse_site_toml_str;

    #[test]
    fn test_starter_config_parses() {
        let config = parse_site_toml_str(starter_site_toml()).unwrap();
        assert_eq!(config.title, "My Blog");
        // optional sections stay commented out in the template
        assert!(config.webmentions.is_none());
        assert!(config.logo.is_none());
    }

    #[tokio::test]
    async fn test_init_refuses_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("site.toml"), "").unwrap();

        let result = run(dir.path().to_path_buf()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_init_scaffolds_directories() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("blog");

        run(site.clone()).await.unwrap();

        assert!(site.join("site.toml").exists());
        assert!(site.join("content").is_dir());
        assert!(site.join("data").is_dir());
    }
}
