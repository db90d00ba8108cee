use super::schema::Database;
use super::types::{now_millis, DatabaseError, NewPost, Post};

/// Hard cap on a single `get_posts` query (OOM protection)
const MAX_POSTS: u32 = 1000;

impl Database {
    // ========================================================================
    // Post Operations
    // ========================================================================

    /// Insert one post.
    ///
    /// Posts are not deduplicated here beyond the unique `url` column: a URL
    /// that was already ingested comes back as [`DatabaseError::Conflict`].
    pub async fn create_post(&self, post: &NewPost) -> Result<Post, DatabaseError> {
        let now = now_millis();
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, url, description, published_at, feed_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, url, description, published_at, feed_id, created_at, updated_at
        "#,
        )
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.description)
        .bind(post.published_at)
        .bind(post.feed_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(post)
    }

    /// Most recent posts first.
    ///
    /// Ordered by `published_at` (undated posts last), then by insertion time.
    /// `limit` is capped at 1000.
    pub async fn get_posts(&self, limit: u32) -> Result<Vec<Post>, DatabaseError> {
        let limit = limit.min(MAX_POSTS);
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, url, description, published_at, feed_id, created_at, updated_at
            FROM posts
            ORDER BY published_at DESC, created_at DESC, id DESC
            LIMIT ?
        "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }
}
