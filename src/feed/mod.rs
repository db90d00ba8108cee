//! Feed retrieval: everything between a feed URL and a list of items.
//!
//! - [`fetcher`] - HTTP download with a timeout and a size cap
//! - [`parser`] - RSS 2.0 decoding and HTML-entity normalisation
//! - [`time`] - publication date parsing over a fixed list of layouts
//!
//! # Example
//!
//! ```ignore
//! use gator::feed::{parse_time, FeedSource, HttpFetcher};
//!
//! let fetcher = HttpFetcher::new(Duration::from_secs(30))?;
//! let feed = fetcher.fetch("https://blog.example.com/index.xml").await?;
//! for item in &feed.items {
//!     let published = parse_time(&item.pub_date)?;
//! }
//! ```

mod fetcher;
mod parser;
mod time;

pub use fetcher::{FeedSource, FetchError, HttpFetcher};
pub use parser::{parse_rss, ParseError, RawFeed, RawItem};
pub use time::{parse_time, TimeParseError};
