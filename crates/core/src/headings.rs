//! Heading extraction for per-page tables of contents.

use crate::types::Heading;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

/// Extract every heading from a markdown document, in document order.
///
/// Slugs are unique within the document: repeated heading text gets a
/// `-2`, `-3`, ... suffix, matching how most anchor generators behave.
pub fn extract_headings(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut current: Option<(u8, String)> = None;

    for event in Parser::new_ext(markdown, Options::empty()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((heading_depth(level), String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((depth, text)) = current.take() {
                    let base = slugify(&text);
                    let count = seen.entry(base.clone()).or_insert(0);
                    *count += 1;
                    let slug = if *count == 1 {
                        base
                    } else {
                        format!("{}-{}", base, count)
                    };
                    headings.push(Heading { text, slug, depth });
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            _ => {}
        }
    }

    headings
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Get a URL-safe slug from heading text
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            // Only keep ASCII alphanumeric for URL safety
            if c.is_ascii_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Setup & Install"), "setup-install");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
        assert_eq!(slugify("CamelCase Title"), "camelcase-title");
    }

    #[test]
    fn test_extract_headings_in_order() {
        let markdown = "\
# Title

intro paragraph

## First Section

body

### Detail

## Second Section
";
        let headings = extract_headings(markdown);
        assert_eq!(headings.len(), 4);
        assert_eq!(headings[0].text, "Title");
        assert_eq!(headings[0].depth, 1);
        assert_eq!(headings[1].slug, "first-section");
        assert_eq!(headings[2].depth, 3);
        assert_eq!(headings[3].slug, "second-section");
    }

    #[test]
    fn test_duplicate_headings_get_suffixed_slugs() {
        let markdown = "## Notes\n\n## Notes\n\n## Notes\n";
        let headings = extract_headings(markdown);
        let slugs: Vec<&str> = headings.iter().map(|h| h.slug.as_str()).collect();
        assert_eq!(slugs, vec!["notes", "notes-2", "notes-3"]);
    }

    #[test]
    fn test_inline_code_kept_in_heading_text() {
        let headings = extract_headings("## Using `merge` safely\n");
        assert_eq!(headings[0].text, "Using merge safely");
        assert_eq!(headings[0].slug, "using-merge-safely");
    }

    #[test]
    fn test_no_headings() {
        assert!(extract_headings("just a paragraph\n").is_empty());
    }
}
