//! Webmention feed and cache records, and the merge that refreshes the
//! cache from a freshly fetched feed.
//!
//! The wire format (both the aggregator's jf2 feed and the cache file)
//! uses hyphenated keys like `wm-id`; every struct here carries explicit
//! serde renames so the Rust field names stay conventional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// h-card for the person who sent the mention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "type")]
    pub author_type: String,
    pub name: String,
    pub photo: String,
    pub url: String,
}

/// Rendered body of a mention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "content-type")]
    pub content_type: String,
    pub value: String,
    pub html: String,
    pub text: String,
}

/// Short content-type/value pair; may disagree with `content`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "content-type")]
    pub content_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rels {
    pub canonical: String,
}

/// One social interaction (like, reply, repost, mention) aimed at a page.
///
/// `wm_id` is the identifier assigned by the aggregator and is the only
/// field guaranteed unique; dedup keys on it. Timestamps stay as the
/// ISO-8601 strings the aggregator sent so round-trips are byte-faithful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebmentionEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub author: Option<Author>,
    pub url: String,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(rename = "wm-received")]
    pub wm_received: String,
    #[serde(rename = "wm-id")]
    pub wm_id: u64,
    #[serde(rename = "wm-source")]
    pub wm_source: String,
    #[serde(rename = "wm-target")]
    pub wm_target: String,
    #[serde(rename = "wm-protocol")]
    pub wm_protocol: String,
    #[serde(default)]
    pub syndication: Option<Vec<String>>,
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(rename = "mention-of")]
    pub mention_of: String,
    #[serde(rename = "wm-property")]
    pub wm_property: String,
    #[serde(rename = "wm-private")]
    pub wm_private: bool,
    #[serde(default)]
    pub rels: Option<Rels>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<Summary>,
}

/// Feed-boundary mirror of `WebmentionEntry` with every field optional.
///
/// Aggregators occasionally ship partial or garbled children; parsing them
/// strictly would fail the whole feed. This layer lets one bad child cost
/// only itself (see [`merge`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(rename = "wm-received", default)]
    pub wm_received: Option<String>,
    #[serde(rename = "wm-id", default)]
    pub wm_id: Option<u64>,
    #[serde(rename = "wm-source", default)]
    pub wm_source: Option<String>,
    #[serde(rename = "wm-target", default)]
    pub wm_target: Option<String>,
    #[serde(rename = "wm-protocol", default)]
    pub wm_protocol: Option<String>,
    #[serde(default)]
    pub syndication: Option<Vec<String>>,
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(rename = "mention-of", default)]
    pub mention_of: Option<String>,
    #[serde(rename = "wm-property", default)]
    pub wm_property: Option<String>,
    #[serde(rename = "wm-private", default)]
    pub wm_private: Option<bool>,
    #[serde(default)]
    pub rels: Option<Rels>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<Summary>,
}

impl RawEntry {
    /// Promote to a full entry. `wm-id` and `url` identify an entry and are
    /// required; other missing scalars default to empty so an otherwise
    /// usable mention is not thrown away.
    pub fn validate(self) -> std::result::Result<WebmentionEntry, MalformedEntry> {
        let Some(wm_id) = self.wm_id else {
            return Err(MalformedEntry {
                wm_id: None,
                url: self.url,
                reason: "missing wm-id".to_string(),
            });
        };
        let Some(url) = self.url else {
            return Err(MalformedEntry {
                wm_id: Some(wm_id),
                url: None,
                reason: "missing url".to_string(),
            });
        };

        Ok(WebmentionEntry {
            entry_type: self.entry_type.unwrap_or_else(|| "entry".to_string()),
            author: self.author,
            url,
            published: self.published,
            wm_received: self.wm_received.unwrap_or_default(),
            wm_id,
            wm_source: self.wm_source.unwrap_or_default(),
            wm_target: self.wm_target.unwrap_or_default(),
            wm_protocol: self.wm_protocol.unwrap_or_default(),
            syndication: self.syndication,
            content: self.content,
            mention_of: self.mention_of.unwrap_or_default(),
            wm_property: self.wm_property.unwrap_or_default(),
            wm_private: self.wm_private.unwrap_or(false),
            rels: self.rels,
            name: self.name,
            photo: self.photo,
            summary: self.summary,
        })
    }
}

impl From<WebmentionEntry> for RawEntry {
    fn from(entry: WebmentionEntry) -> Self {
        RawEntry {
            entry_type: Some(entry.entry_type),
            author: entry.author,
            url: Some(entry.url),
            published: entry.published,
            wm_received: Some(entry.wm_received),
            wm_id: Some(entry.wm_id),
            wm_source: Some(entry.wm_source),
            wm_target: Some(entry.wm_target),
            wm_protocol: Some(entry.wm_protocol),
            syndication: entry.syndication,
            content: entry.content,
            mention_of: Some(entry.mention_of),
            wm_property: Some(entry.wm_property),
            wm_private: Some(entry.wm_private),
            rels: entry.rels,
            name: entry.name,
            photo: entry.photo,
            summary: entry.summary,
        }
    }
}

/// A feed child that could not be promoted to a `WebmentionEntry`.
/// Skipped during merge; the caller decides how loudly to report it.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedEntry {
    pub wm_id: Option<u64>,
    pub url: Option<String>,
    pub reason: String,
}

impl fmt::Display for MalformedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.wm_id, &self.url) {
            (Some(id), _) => write!(f, "entry wm-id={}: {}", id, self.reason),
            (None, Some(url)) => write!(f, "entry {}: {}", url, self.reason),
            (None, None) => write!(f, "unidentifiable entry: {}", self.reason),
        }
    }
}

/// Freshly fetched feed from the aggregator, children unordered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebmentionsFeed {
    #[serde(rename = "type", default)]
    pub feed_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub children: Vec<RawEntry>,
}

impl WebmentionsFeed {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The persisted snapshot: everything merged so far, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebmentionsCache {
    #[serde(rename = "lastFetched")]
    pub last_fetched: Option<DateTime<Utc>>,
    pub children: Vec<WebmentionEntry>,
}

impl WebmentionsCache {
    /// Cold-start snapshot: never fetched, nothing cached
    pub fn empty() -> Self {
        Self::default()
    }

    /// View the cache as a feed, for re-merging
    pub fn as_feed(&self) -> WebmentionsFeed {
        WebmentionsFeed {
            feed_type: "feed".to_string(),
            name: "Webmentions".to_string(),
            children: self.children.iter().cloned().map(RawEntry::from).collect(),
        }
    }
}

/// Outcome of a merge pass. `cache` is the snapshot to persist; the counts
/// and skip list let the caller report what happened.
#[derive(Debug)]
pub struct MergeReport {
    pub cache: WebmentionsCache,
    pub added: usize,
    pub updated: usize,
    pub skipped: Vec<MalformedEntry>,
}

/// Merge a freshly fetched feed into the previous cache snapshot.
///
/// Pure function over immutable inputs:
/// - dedup by `wm-id`, the incoming copy wins (the aggregator is
///   authoritative, entries can be edited or redacted upstream)
/// - entries the feed did not re-send are retained unchanged
/// - output sorted newest first by `published` (falling back to
///   `wm-received`), ties broken by ascending `wm-id`
/// - `last_fetched` set to `fetched_at` unconditionally
/// - malformed children are skipped, never the whole feed
pub fn merge(
    previous: &WebmentionsCache,
    incoming: &WebmentionsFeed,
    fetched_at: DateTime<Utc>,
) -> MergeReport {
    let mut by_id: BTreeMap<u64, WebmentionEntry> = previous
        .children
        .iter()
        .map(|entry| (entry.wm_id, entry.clone()))
        .collect();

    let mut added = 0;
    let mut updated = 0;
    let mut skipped = Vec::new();

    for raw in &incoming.children {
        match raw.clone().validate() {
            Ok(entry) => match by_id.insert(entry.wm_id, entry) {
                Some(_) => updated += 1,
                None => added += 1,
            },
            Err(bad) => skipped.push(bad),
        }
    }

    let mut children: Vec<WebmentionEntry> = by_id.into_values().collect();
    children.sort_by(|a, b| {
        effective_timestamp(b)
            .cmp(&effective_timestamp(a))
            .then(a.wm_id.cmp(&b.wm_id))
    });

    MergeReport {
        cache: WebmentionsCache {
            last_fetched: Some(fetched_at),
            children,
        },
        added,
        updated,
        skipped,
    }
}

/// Sort key: `published` when the author dated the post, otherwise the time
/// the aggregator received the mention. Unparseable timestamps sort as the
/// epoch so they sink to the bottom instead of aborting the merge.
fn effective_timestamp(entry: &WebmentionEntry) -> DateTime<Utc> {
    entry
        .published
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| parse_timestamp(&entry.wm_received))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
