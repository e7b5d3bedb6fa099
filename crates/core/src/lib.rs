pub mod config;
pub mod error;
pub mod headings;
pub mod types;
pub mod webmentions;

pub use config::parse_site_toml;
pub use error::{Error, Result};
pub use types::*;
pub use webmentions::{merge, MergeReport, WebmentionsCache, WebmentionsFeed};
