use sqlx::FromRow;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// A lookup by key matched no row
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique constraint rejected the write
    #[error("Already exists: {0}")]
    Conflict(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    /// Classify unique-constraint violations as [`DatabaseError::Conflict`] so
    /// callers can tell "already there" apart from real failures.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DatabaseError::Conflict(db_err.message().to_string());
            }
        }
        DatabaseError::Other(err)
    }
}

// ============================================================================
// Input Types
// ============================================================================

/// A post ready to be inserted by the scraper
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    /// Unix milliseconds
    pub published_at: Option<i64>,
    pub feed_id: i64,
}

// ============================================================================
// Data Structures
// ============================================================================

/// All `*_at` columns hold Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Feed {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// Owning user
    pub user_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
    /// `None` until the scraper first picks the feed
    pub last_fetched_at: Option<i64>,
}

/// Feed joined with the name of the user who added it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedWithOwner {
    pub feed: Feed,
    pub owner_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FeedFollow {
    pub id: i64,
    pub user_id: i64,
    pub feed_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Projection used by the `following` listing
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FollowedFeed {
    pub feed_name: String,
    pub feed_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<i64>,
    pub feed_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Row type for the feeds-with-owner join
pub(crate) type FeedOwnerRow = (i64, String, String, i64, i64, i64, Option<i64>, String);

/// Current wall-clock time in Unix milliseconds
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
