//! realty-content: blog content for a real estate agent site.
//!
//! Pulls posts from a WordPress REST API, falling back to the RSS feed, a
//! scrape of the blog index, and a secondary REST endpoint. Also carries
//! the small pure utilities the site needs: text and date helpers,
//! mortgage arithmetic, and a JSON-LD lint.

pub mod config;
pub mod dates;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod http;
pub mod mortgage;
pub mod schema;
pub mod scrape;
pub mod text;
pub mod types;
pub mod wordpress;

pub use config::{Credentials, FetcherConfig, WordPressConfig};
pub use error::{ContentError, ContentResult};
pub use fetcher::{BlogFetcher, ContentSource, FetchReport};
pub use text::calculate_reading_time;
pub use types::*;
pub use wordpress::{BlogService, WordPressClient};
