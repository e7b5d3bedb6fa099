use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSite,
    #[serde(default)]
    webmentions: Option<RawWebmentions>,
    #[serde(default)]
    logo: Option<RawLogo>,
    #[serde(default)]
    social: Vec<RawSocial>,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    author: String,
    title: String,
    description: String,
    lang: String,
    og_locale: String,
    home_page_slug: String,
    #[serde(default)]
    date: Option<RawDate>,
}

#[derive(Debug, Deserialize)]
struct RawDate {
    locale: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawWebmentions {
    link: String,
    pingback: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLogo {
    path: Option<String>, // Convert to PathBuf after validation
    emoji: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSocial {
    name: String,
    friendly_name: String,
    link: String,
    #[serde(default)]
    is_webmention: bool,
}

/// Default date format when site.toml does not set one ("12 August 2024")
const DEFAULT_DATE_FORMAT: &str = "%-d %B %Y";

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    require_non_empty(&raw.site.author, "site.author")?;
    require_non_empty(&raw.site.title, "site.title")?;
    require_non_empty(&raw.site.lang, "site.lang")?;
    require_non_empty(&raw.site.og_locale, "site.og_locale")?;
    validate_slug(&raw.site.home_page_slug, "site.home_page_slug")?;

    // Date rendering defaults to the site language
    let date = match raw.site.date {
        Some(d) => DateConfig {
            locale: d.locale.unwrap_or_else(|| raw.site.lang.clone()),
            format: d.format.unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
        },
        None => DateConfig {
            locale: raw.site.lang.clone(),
            format: DEFAULT_DATE_FORMAT.to_string(),
        },
    };

    let webmentions = match raw.webmentions {
        Some(wm) => {
            validate_endpoint_url(&wm.link, "webmentions.link")?;
            if let Some(pingback) = &wm.pingback {
                validate_endpoint_url(pingback, "webmentions.pingback")?;
            }
            Some(WebmentionConfig {
                link: wm.link,
                pingback: wm.pingback,
            })
        }
        None => None,
    };

    let logo = match raw.logo {
        Some(l) => Some(convert_logo(l)?),
        None => None,
    };

    let social_links: Result<Vec<SocialLink>> = raw
        .social
        .into_iter()
        .map(|s| {
            validate_endpoint_url(&s.link, "social.link")?;
            Ok(SocialLink {
                name: s.name,
                friendly_name: s.friendly_name,
                link: s.link,
                is_webmention: s.is_webmention,
            })
        })
        .collect();

    Ok(SiteConfig {
        author: raw.site.author,
        title: raw.site.title,
        description: raw.site.description,
        lang: raw.site.lang,
        og_locale: raw.site.og_locale,
        date,
        home_page_slug: raw.site.home_page_slug,
        webmentions,
        logo,
        social_links: social_links?,
    })
}

fn convert_logo(raw: RawLogo) -> Result<Logo> {
    match (raw.path, raw.emoji) {
        (Some(path), None) => Ok(Logo::File {
            path: validate_path(&path, "logo.path")?,
        }),
        (None, Some(emoji)) => {
            require_non_empty(&emoji, "logo.emoji")?;
            Ok(Logo::Emoji { emoji })
        }
        (Some(_), Some(_)) => Err(Error::ConfigParse(
            "Set either logo.path or logo.emoji, not both".to_string(),
        )),
        (None, None) => Err(Error::ConfigParse(
            "Logo table present but neither logo.path nor logo.emoji set".to_string(),
        )),
    }
}

fn require_non_empty(value: &str, field_name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty value in '{}' field",
            field_name
        )));
    }
    Ok(())
}

/// A slug is a single path segment: no separators, no whitespace
fn validate_slug(slug: &str, field_name: &str) -> Result<()> {
    require_non_empty(slug, field_name)?;
    if slug.contains('/') || slug.contains(char::is_whitespace) {
        return Err(Error::ConfigParse(format!(
            "'{}' must be a bare slug (no '/' or whitespace): '{}'",
            field_name, slug
        )));
    }
    Ok(())
}

/// Endpoint URLs must be absolute http(s); anything else breaks the
/// <link rel> tags and the fetch cycle in confusing ways much later.
fn validate_endpoint_url(url: &str, field_name: &str) -> Result<()> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(Error::ConfigParse(format!(
            "'{}' must be an absolute http(s) URL: '{}'",
            field_name, url
        )));
    }
    Ok(())
}

/// Validate and convert a path string to PathBuf.
///
/// Rejects absolute paths and parent directory references so a site.toml
/// can never point outside the site directory.
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r##"
[site]
author = "Test Author"
title = "Test Blog"
description = "A test blog"
lang = "en-GB"
og_locale = "en_GB"
home_page_slug = "home"
"##;

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_site_toml_str(MINIMAL_TOML).unwrap();
        assert_eq!(config.title, "Test Blog");
        assert_eq!(config.author, "Test Author");
        assert!(config.webmentions.is_none());
        assert!(config.logo.is_none());
        assert!(config.social_links.is_empty());
    }

    #[test]
    fn test_date_defaults_to_site_lang() {
        let config = parse_site_toml_str(MINIMAL_TOML).unwrap();
        assert_eq!(config.date.locale, "en-GB");
        assert_eq!(config.date.format, DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r##"
[site]
author = "Test Author"
title = "Test Blog"
description = "A test blog"
lang = "en-GB"
og_locale = "en_GB"
home_page_slug = "home"

[site.date]
locale = "en-US"
format = "%B %-d, %Y"

[webmentions]
link = "https://webmention.io/example.com/webmention"
pingback = "https://webmention.io/example.com/xmlrpc"

[logo]
path = "assets/logo.png"

[[social]]
name = "mastodon"
friendly_name = "Mastodon"
link = "https://indieweb.social/@example"
is_webmention = true

[[social]]
name = "github"
friendly_name = "GitHub"
link = "https://github.com/example"
"##;

        let config = parse_site_toml_str(toml).unwrap();
        let wm = config.webmentions.unwrap();
        assert_eq!(wm.link, "https://webmention.io/example.com/webmention");
        assert!(wm.pingback.is_some());
        assert!(matches!(config.logo, Some(Logo::File { .. })));
        assert_eq!(config.social_links.len(), 2);
        assert!(config.social_links[0].is_webmention);
        assert!(!config.social_links[1].is_webmention);
        assert_eq!(config.date.locale, "en-US");
    }

    #[test]
    fn test_rejects_relative_webmention_endpoint() {
        let toml = format!(
            "{}\n[webmentions]\nlink = \"/webmention\"\n",
            MINIMAL_TOML
        );
        let result = parse_site_toml_str(&toml);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("absolute http(s) URL")
        );
    }

    #[test]
    fn test_rejects_slug_with_separator() {
        let toml = MINIMAL_TOML.replace("\"home\"", "\"posts/home\"");
        let result = parse_site_toml_str(&toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("bare slug"));
    }

    #[test]
    fn test_rejects_path_traversal_in_logo() {
        let toml = format!("{}\n[logo]\npath = \"../secrets.png\"\n", MINIMAL_TOML);
        let result = parse_site_toml_str(&toml);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Parent directory references")
        );
    }

    #[test]
    fn test_rejects_absolute_logo_path() {
        let toml = format!("{}\n[logo]\npath = \"/etc/passwd\"\n", MINIMAL_TOML);
        let result = parse_site_toml_str(&toml);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Absolute paths not allowed")
        );
    }

    #[test]
    fn test_rejects_logo_with_both_forms() {
        let toml = format!(
            "{}\n[logo]\npath = \"assets/logo.png\"\nemoji = \"🌱\"\n",
            MINIMAL_TOML
        );
        let result = parse_site_toml_str(&toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not both"));
    }

    #[test]
    fn test_emoji_logo() {
        let toml = format!("{}\n[logo]\nemoji = \"🌱\"\n", MINIMAL_TOML);
        let config = parse_site_toml_str(&toml).unwrap();
        match config.logo {
            Some(Logo::Emoji { emoji }) => assert_eq!(emoji, "🌱"),
            other => panic!("expected emoji logo, got {:?}", other),
        }
    }
}
