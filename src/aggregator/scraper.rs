use thiserror::Error;

use crate::feed::{parse_time, FeedSource, FetchError, RawItem};
use crate::storage::{Database, DatabaseError, NewPost};

/// Errors that abort a whole scrape cycle.
///
/// Per-item problems never show up here; they are logged and counted in
/// [`ScrapeReport`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no feeds to fetch")]
    NoFeeds,
    #[error(transparent)]
    Store(#[from] DatabaseError),
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}

/// Outcome of one successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub feed_id: i64,
    pub feed_name: String,
    /// Posts inserted
    pub created: usize,
    /// Items whose URL was already stored
    pub duplicates: usize,
    /// Items dropped because their date did not parse
    pub skipped: usize,
    /// Items the store refused for any other reason
    pub failed: usize,
}

/// Run one polling cycle against the stalest feed.
///
/// 1. Pick the feed with the oldest (or no) `last_fetched_at`.
/// 2. Mark it fetched *before* downloading. "Fetched" therefore means
///    "attempted": a feed that keeps failing still rotates to the back of the
///    queue instead of being picked again on every tick.
/// 3. Fetch and decode it; any failure here fails the cycle.
/// 4. Store each item on its own. A bad date or a rejected insert only costs
///    that item.
///
/// # Errors
///
/// - [`ScrapeError::NoFeeds`] - the store has no feeds
/// - [`ScrapeError::Store`] - selecting or marking the feed failed
/// - [`ScrapeError::Fetch`] - download or decode failed
pub async fn scrape_feeds<S: FeedSource>(
    db: &Database,
    source: &S,
) -> Result<ScrapeReport, ScrapeError> {
    let feed = db
        .get_next_feed_to_fetch()
        .await?
        .ok_or(ScrapeError::NoFeeds)?;

    db.mark_feed_fetched(feed.id, chrono::Utc::now().timestamp_millis())
        .await?;

    let raw = source
        .fetch(&feed.url)
        .await
        .map_err(|source| ScrapeError::Fetch {
            url: feed.url.clone(),
            source,
        })?;

    let mut report = ScrapeReport {
        feed_id: feed.id,
        feed_name: feed.name.clone(),
        ..ScrapeReport::default()
    };

    for item in raw.items {
        store_item(db, feed.id, item, &mut report).await;
    }

    tracing::info!(
        feed_id = feed.id,
        feed = %feed.name,
        created = report.created,
        duplicates = report.duplicates,
        skipped = report.skipped,
        failed = report.failed,
        "Scraped feed"
    );
    Ok(report)
}

async fn store_item(db: &Database, feed_id: i64, item: RawItem, report: &mut ScrapeReport) {
    let published = match parse_time(&item.pub_date) {
        Ok(published) => published,
        Err(e) => {
            tracing::warn!(feed_id, title = %item.title, error = %e, "Skipping item");
            report.skipped += 1;
            return;
        }
    };

    let post = NewPost {
        title: item.title,
        url: item.link,
        description: Some(item.description),
        published_at: Some(published.timestamp_millis()),
        feed_id,
    };

    match db.create_post(&post).await {
        Ok(_) => report.created += 1,
        Err(DatabaseError::Conflict(_)) => {
            tracing::debug!(feed_id, url = %post.url, "Post already stored");
            report.duplicates += 1;
        }
        Err(e) => {
            tracing::warn!(feed_id, url = %post.url, error = %e, "Failed to store post");
            report.failed += 1;
        }
    }
}
