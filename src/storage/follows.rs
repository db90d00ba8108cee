use super::schema::Database;
use super::types::{now_millis, DatabaseError, FeedFollow, FollowedFeed};

impl Database {
    // ========================================================================
    // Feed Follow Operations
    // ========================================================================

    /// Bind `user_id` to `feed_id`.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::Conflict`] when the user already follows the feed.
    pub async fn create_feed_follow(
        &self,
        user_id: i64,
        feed_id: i64,
    ) -> Result<FeedFollow, DatabaseError> {
        let now = now_millis();
        let follow = sqlx::query_as::<_, FeedFollow>(
            r#"
            INSERT INTO feed_follows (user_id, feed_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, feed_id, created_at, updated_at
        "#,
        )
        .bind(user_id)
        .bind(feed_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(follow)
    }

    /// Remove the follow binding, returning how many rows went away (0 or 1).
    pub async fn delete_feed_follow(&self, user_id: i64, feed_id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM feed_follows WHERE user_id = ? AND feed_id = ?")
            .bind(user_id)
            .bind(feed_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Feeds followed by `user_id`, ordered by feed name
    pub async fn get_feed_follows_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<FollowedFeed>, DatabaseError> {
        let follows = sqlx::query_as::<_, FollowedFeed>(
            r#"
            SELECT f.name AS feed_name, f.url AS feed_url
            FROM feed_follows ff
            JOIN feeds f ON f.id = ff.feed_id
            WHERE ff.user_id = ?
            ORDER BY f.name, f.id
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(follows)
    }
}
