use super::schema::Database;
use super::types::{now_millis, DatabaseError, Feed, FeedOwnerRow, FeedWithOwner};

const FEED_COLUMNS: &str = "id, name, url, user_id, created_at, updated_at, last_fetched_at";

impl Database {
    // ========================================================================
    // Feed Operations
    // ========================================================================

    /// Insert a feed owned by `user_id`.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::Conflict`] when a feed with this URL already exists.
    pub async fn create_feed(
        &self,
        name: &str,
        url: &str,
        user_id: i64,
    ) -> Result<Feed, DatabaseError> {
        let now = now_millis();
        let feed = sqlx::query_as::<_, Feed>(&format!(
            r#"
            INSERT INTO feeds (name, url, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {FEED_COLUMNS}
        "#
        ))
        .bind(name)
        .bind(url)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!(feed_id = feed.id, url = %feed.url, "Created feed");
        Ok(feed)
    }

    /// Look a feed up by its URL, the key users follow and unfollow by.
    pub async fn get_feed_by_url(&self, url: &str) -> Result<Feed, DatabaseError> {
        sqlx::query_as::<_, Feed>(&format!("SELECT {FEED_COLUMNS} FROM feeds WHERE url = ?"))
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("feed {:?}", url)))
    }

    /// All feeds with the name of the user who added each, ordered by feed name
    pub async fn get_feeds_with_owners(&self) -> Result<Vec<FeedWithOwner>, DatabaseError> {
        let rows: Vec<FeedOwnerRow> = sqlx::query_as(
            r#"
                SELECT
                    f.id, f.name, f.url, f.user_id, f.created_at, f.updated_at,
                    f.last_fetched_at, u.name
                FROM feeds f
                JOIN users u ON u.id = f.user_id
                ORDER BY f.name, f.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let feeds = rows
            .into_iter()
            .map(
                |(id, name, url, user_id, created_at, updated_at, last_fetched_at, owner_name)| {
                    FeedWithOwner {
                        feed: Feed {
                            id,
                            name,
                            url,
                            user_id,
                            created_at,
                            updated_at,
                            last_fetched_at,
                        },
                        owner_name,
                    }
                },
            )
            .collect();

        Ok(feeds)
    }

    /// The feed that has waited longest: never-fetched feeds first, then the
    /// oldest `last_fetched_at`, ties broken by id. `None` when there are no feeds.
    pub async fn get_next_feed_to_fetch(&self) -> Result<Option<Feed>, DatabaseError> {
        // SQLite sorts NULL before any value in ascending order
        let feed = sqlx::query_as::<_, Feed>(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds ORDER BY last_fetched_at ASC, id ASC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(feed)
    }

    /// Record that `feed_id` was picked for fetching at `now` (Unix ms).
    ///
    /// `last_fetched_at` never moves backwards: an older `now` than the stored
    /// value leaves the stored value in place.
    pub async fn mark_feed_fetched(&self, feed_id: i64, now: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE feeds
            SET last_fetched_at = MAX(COALESCE(last_fetched_at, ?1), ?1),
                updated_at = MAX(updated_at, ?1)
            WHERE id = ?2
        "#,
        )
        .bind(now)
        .bind(feed_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("feed id {}", feed_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Database, DatabaseError};

    async fn test_db() -> (Database, i64) {
        let db = Database::open(":memory:").await.unwrap();
        let user = db.create_user("alice").await.unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_create_feed_and_lookup_by_url() {
        let (db, user_id) = test_db().await;
        let feed = db
            .create_feed("Blog", "https://example.com/rss", user_id)
            .await
            .unwrap();
        assert_eq!(feed.name, "Blog");
        assert_eq!(feed.user_id, user_id);
        assert_eq!(feed.last_fetched_at, None);

        let found = db.get_feed_by_url("https://example.com/rss").await.unwrap();
        assert_eq!(found, feed);
    }

    #[tokio::test]
    async fn test_duplicate_feed_url_is_conflict() {
        let (db, user_id) = test_db().await;
        db.create_feed("A", "https://example.com/rss", user_id)
            .await
            .unwrap();
        let err = db
            .create_feed("B", "https://example.com/rss", user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unknown_url_is_not_found() {
        let (db, _) = test_db().await;
        let err = db.get_feed_by_url("https://nope.example/").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_feed_requires_existing_owner() {
        let (db, _) = test_db().await;
        let result = db.create_feed("Orphan", "https://example.com/rss", 999).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_feeds_with_owners() {
        let (db, alice) = test_db().await;
        let bob = db.create_user("bob").await.unwrap().id;
        db.create_feed("Zed", "https://z.example/rss", alice)
            .await
            .unwrap();
        db.create_feed("Alpha", "https://a.example/rss", bob)
            .await
            .unwrap();

        let feeds = db.get_feeds_with_owners().await.unwrap();
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].feed.name, "Alpha");
        assert_eq!(feeds[0].owner_name, "bob");
        assert_eq!(feeds[1].feed.name, "Zed");
        assert_eq!(feeds[1].owner_name, "alice");
    }

    #[tokio::test]
    async fn test_next_feed_prefers_never_fetched() {
        let (db, user_id) = test_db().await;
        let fetched = db
            .create_feed("Fetched", "https://a.example/rss", user_id)
            .await
            .unwrap();
        let fresh = db
            .create_feed("Fresh", "https://b.example/rss", user_id)
            .await
            .unwrap();
        db.mark_feed_fetched(fetched.id, 1_000).await.unwrap();

        let next = db.get_next_feed_to_fetch().await.unwrap().unwrap();
        assert_eq!(next.id, fresh.id);
    }

    #[tokio::test]
    async fn test_next_feed_is_oldest_fetched() {
        let (db, user_id) = test_db().await;
        let a = db
            .create_feed("A", "https://a.example/rss", user_id)
            .await
            .unwrap();
        let b = db
            .create_feed("B", "https://b.example/rss", user_id)
            .await
            .unwrap();
        db.mark_feed_fetched(a.id, 2_000).await.unwrap();
        db.mark_feed_fetched(b.id, 1_000).await.unwrap();

        let next = db.get_next_feed_to_fetch().await.unwrap().unwrap();
        assert_eq!(next.id, b.id);
    }

    #[tokio::test]
    async fn test_next_feed_rotates_round_robin() {
        let (db, user_id) = test_db().await;
        for i in 0..3 {
            db.create_feed(&format!("F{i}"), &format!("https://f{i}.example/rss"), user_id)
                .await
                .unwrap();
        }

        let mut order = Vec::new();
        for now in 1..=6 {
            let next = db.get_next_feed_to_fetch().await.unwrap().unwrap();
            db.mark_feed_fetched(next.id, now * 1_000).await.unwrap();
            order.push(next.name);
        }
        assert_eq!(order, ["F0", "F1", "F2", "F0", "F1", "F2"]);
    }

    #[tokio::test]
    async fn test_next_feed_empty_store() {
        let (db, _) = test_db().await;
        assert!(db.get_next_feed_to_fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_fetched_never_goes_backwards() {
        let (db, user_id) = test_db().await;
        let feed = db
            .create_feed("A", "https://a.example/rss", user_id)
            .await
            .unwrap();
        db.mark_feed_fetched(feed.id, 5_000).await.unwrap();
        db.mark_feed_fetched(feed.id, 3_000).await.unwrap();

        let stored = db.get_feed_by_url(&feed.url).await.unwrap();
        assert_eq!(stored.last_fetched_at, Some(5_000));
    }

    #[tokio::test]
    async fn test_mark_unknown_feed_is_not_found() {
        let (db, _) = test_db().await;
        let err = db.mark_feed_fetched(42, 1_000).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }
}
