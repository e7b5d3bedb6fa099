use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub author: String,
    pub title: String,
    pub description: String,
    pub lang: String,
    pub og_locale: String,
    pub date: DateConfig,
    pub home_page_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webmentions: Option<WebmentionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    pub social_links: Vec<SocialLink>,
}

/// How dates are rendered in templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateConfig {
    pub locale: String,
    /// strftime-style format string
    pub format: String,
}

/// Webmention endpoints advertised by the site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebmentionConfig {
    /// Receiving endpoint, e.g. https://webmention.io/example.com/webmention
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pingback: Option<String>,
}

/// Site logo: either an image file shipped with the site or a bare emoji
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Logo {
    File { path: PathBuf },
    Emoji { emoji: String },
}

/// One entry in the site's social link list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    pub name: String,
    pub friendly_name: String,
    pub link: String,
    /// Whether the profile should be offered as a webmention source
    #[serde(default)]
    pub is_webmention: bool,
}

/// Prev/next link rendered by pagination templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationLink {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sr_label: Option<String>,
}

impl PaginationLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: None,
            sr_label: None,
        }
    }

    /// Label for assistive tech: the screen-reader text when set, else the
    /// visible text, else the bare URL.
    pub fn accessible_label(&self) -> &str {
        self.sr_label
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or(&self.url)
    }
}

/// Per-page metadata consumed by the head template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMeta {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_date: Option<String>,
}

/// Table-of-contents entry extracted from a markdown document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    pub slug: String,
    pub depth: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_label_falls_back_to_text_then_url() {
        let mut link = PaginationLink::new("/posts/2");
        assert_eq!(link.accessible_label(), "/posts/2");

        link.text = Some("Older posts".to_string());
        assert_eq!(link.accessible_label(), "Older posts");

        link.sr_label = Some("Go to older posts".to_string());
        assert_eq!(link.accessible_label(), "Go to older posts");
    }

    #[test]
    fn logo_deserializes_as_file_or_emoji() {
        let file: Logo = toml::from_str(r#"path = "assets/logo.png""#).unwrap();
        assert!(matches!(file, Logo::File { .. }));

        let emoji: Logo = toml::from_str(r#"emoji = "🌱""#).unwrap();
        assert!(matches!(emoji, Logo::Emoji { .. }));
    }

    #[test]
    fn site_meta_omits_absent_fields_when_serialized() {
        let meta = SiteMeta {
            title: "About".to_string(),
            description: None,
            og_image: None,
            article_date: None,
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"title":"About"}"#);
    }
}
