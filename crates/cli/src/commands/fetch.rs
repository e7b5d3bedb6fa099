use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mention_kit_core::config::parse_site_toml;
use mention_kit_core::webmentions::{WebmentionsCache, WebmentionsFeed, merge};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the aggregator API token
const TOKEN_ENV: &str = "WEBMENTION_API_KEY";

/// Page size requested from the aggregator
const PER_PAGE: usize = 1000;

/// Path of the cache file inside a site directory
pub fn cache_path(site_dir: &Path) -> PathBuf {
    site_dir.join("data").join("webmentions.json")
}

/// Load the cached snapshot. A missing or unparseable cache is a cold
/// start, never a failed run; the next save rewrites the file whole.
pub fn load_cache(path: &Path) -> WebmentionsCache {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return WebmentionsCache::empty(),
    };
    match serde_json::from_str(&contents) {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!(
                "   ⚠ Warning: ignoring unparseable cache {}: {}",
                path.display(),
                err
            );
            WebmentionsCache::empty()
        }
    }
}

/// Persist the snapshot: write a sibling temp file, then rename it over
/// the old cache so a failed write never clobbers the last good copy.
pub fn save_cache(path: &Path, cache: &WebmentionsCache) -> Result<()> {
    let parent = path
        .parent()
        .context("Cache path has no parent directory")?;
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create {}", parent.display()))?;

    let contents =
        serde_json::to_string_pretty(cache).context("Failed to serialize cache")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Split a receiving endpoint like
/// `https://webmention.io/example.com/webmention` into the API base
/// (`https://webmention.io`) and the account domain (`example.com`).
fn endpoint_parts(link: &str) -> Result<(String, String)> {
    let (scheme, rest) = if let Some(rest) = link.strip_prefix("https://") {
        ("https://", rest)
    } else if let Some(rest) = link.strip_prefix("http://") {
        ("http://", rest)
    } else {
        anyhow::bail!("Webmention endpoint is not an http(s) URL: {}", link);
    };

    let mut segments = rest.split('/');
    let host = segments
        .next()
        .filter(|h| !h.is_empty())
        .with_context(|| format!("Webmention endpoint has no host: {}", link))?;
    let domain = segments
        .next()
        .filter(|d| !d.is_empty())
        .with_context(|| {
            format!(
                "Webmention endpoint has no account domain segment: {}",
                link
            )
        })?;

    Ok((format!("{}{}", scheme, host), domain.to_string()))
}

// ============================================================================
// Aggregator API Client
// ============================================================================

/// webmention.io-style aggregator client
struct WebmentionClient {
    client: reqwest::Client,
    api_base: String,
}

impl WebmentionClient {
    /// Create new aggregator API client
    fn new(api_base: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mention-kit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.to_string(),
        })
    }

    /// Fetch the mention feed for a domain. With `since` set, the
    /// aggregator returns only mentions received after that instant.
    async fn fetch_feed(
        &self,
        domain: &str,
        token: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<WebmentionsFeed> {
        let mut url = format!(
            "{}/api/mentions.jf2?domain={}&token={}&per-page={}",
            self.api_base, domain, token, PER_PAGE
        );
        if let Some(since) = since {
            url.push_str(&format!("&since={}", since.to_rfc3339()));
        }

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Aggregator request failed ({})", status);
        }

        let feed: WebmentionsFeed = response
            .json()
            .await
            .context("Aggregator returned an unparseable feed")?;
        Ok(feed)
    }
}

/// Run one fetch cycle: load the cache, query the aggregator, merge,
/// persist. A malformed child only costs itself; a failed save leaves the
/// last good cache on disk for the next run to retry against.
pub async fn run(path: PathBuf, full: bool) -> Result<()> {
    println!("📥 Fetching webmentions...");
    println!("   Site: {}", path.display());
    println!();

    let config_path = path.join("site.toml");
    if !config_path.exists() {
        anyhow::bail!(
            "site.toml not found in {}\nRun 'mention-kit init {}' first",
            path.display(),
            path.display()
        );
    }
    let config = parse_site_toml(&config_path).context("Failed to parse site.toml")?;

    let webmentions = config
        .webmentions
        .context("No [webmentions] section in site.toml; nothing to fetch")?;
    let (api_base, domain) = endpoint_parts(&webmentions.link)?;
    let token = std::env::var(TOKEN_ENV)
        .with_context(|| format!("{} not set (aggregator API token)", TOKEN_ENV))?;

    let cache_file = cache_path(&path);
    let previous = load_cache(&cache_file);
    match previous.last_fetched {
        Some(last) => println!("✓ Loaded cache: {} entries, last fetched {}", previous.children.len(), last),
        None => println!("✓ No cache yet, cold start"),
    }

    let since = if full { None } else { previous.last_fetched };
    if full {
        println!("  Pulling full mention history");
    }

    let client = WebmentionClient::new(&api_base)?;
    let feed = client.fetch_feed(&domain, &token, since).await?;
    println!("✓ Received {} entries for {}", feed.children.len(), domain);

    let report = merge(&previous, &feed, Utc::now());
    for bad in &report.skipped {
        eprintln!("   ⚠ Warning: skipped malformed {}", bad);
    }

    save_cache(&cache_file, &report.cache)?;

    println!();
    println!("✅ Cache updated!");
    println!("   Added:   {}", report.added);
    println!("   Updated: {}", report.updated);
    println!("   Skipped: {}", report.skipped.len());
    println!("   Total:   {}", report.cache.children.len());
    println!("   Cache:   {}", cache_file.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_parts() {
        let (base, domain) =
            endpoint_parts("https://webmention.io/example.com/webmention").unwrap();
        assert_eq!(base, "https://webmention.io");
        assert_eq!(domain, "example.com");

        assert!(endpoint_parts("https://webmention.io/").is_err());
        assert!(endpoint_parts("ftp://webmention.io/example.com").is_err());
    }

    #[test]
    fn test_load_cache_missing_file_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let cache = load_cache(&dir.path().join("nope.json"));
        assert!(cache.last_fetched.is_none());
        assert!(cache.children.is_empty());
    }

    #[test]
    fn test_load_cache_garbage_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webmentions.json");
        fs::write(&path, "{ not json").unwrap();
        let cache = load_cache(&path);
        assert!(cache.last_fetched.is_none());
        assert!(cache.children.is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());

        let mut cache = WebmentionsCache::empty();
        cache.last_fetched = Some(Utc::now());
        save_cache(&path, &cache).unwrap();

        let loaded = load_cache(&path);
        assert_eq!(loaded.last_fetched, cache.last_fetched);
        // no stray temp file left behind
        assert!(!path.with_extension("json.tmp").exists());
    }
}
