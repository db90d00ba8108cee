use super::schema::Database;
use super::types::{now_millis, DatabaseError, User};

impl Database {
    // ========================================================================
    // User Operations
    // ========================================================================

    /// Look a user up by name.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::NotFound`] when no user has that name.
    pub async fn get_user(&self, name: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("user {:?}", name)))
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// [`DatabaseError::Conflict`] when the name is already taken.
    pub async fn create_user(&self, name: &str) -> Result<User, DatabaseError> {
        let now = now_millis();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, created_at, updated_at)
            VALUES (?, ?, ?)
            RETURNING id, name, created_at, updated_at
        "#,
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!(user_id = user.id, name = %user.name, "Created user");
        Ok(user)
    }

    /// All users, ordered by name
    pub async fn get_users(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, created_at, updated_at FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Delete every user. Feeds, follows and posts go with them via
    /// `ON DELETE CASCADE`. Returns the number of users removed.
    pub async fn reset_users(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Database, DatabaseError};

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = test_db().await;
        let created = db.create_user("alice").await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.name, "alice");

        let fetched = db.get_user("alice").await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found() {
        let db = test_db().await;
        let err = db.get_user("ghost").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn test_duplicate_user_is_conflict() {
        let db = test_db().await;
        db.create_user("alice").await.unwrap();
        let err = db.create_user("alice").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_get_users_sorted_by_name() {
        let db = test_db().await;
        db.create_user("carol").await.unwrap();
        db.create_user("alice").await.unwrap();
        db.create_user("bob").await.unwrap();

        let names: Vec<String> = db
            .get_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, ["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn test_reset_users_cascades() {
        let db = test_db().await;
        let user = db.create_user("alice").await.unwrap();
        let feed = db
            .create_feed("Blog", "https://example.com/rss", user.id)
            .await
            .unwrap();
        db.create_feed_follow(user.id, feed.id).await.unwrap();

        let removed = db.reset_users().await.unwrap();
        assert_eq!(removed, 1);
        assert!(db.get_users().await.unwrap().is_empty());
        assert!(db.get_feeds_with_owners().await.unwrap().is_empty());
        assert!(db.get_next_feed_to_fetch().await.unwrap().is_none());
    }
}
