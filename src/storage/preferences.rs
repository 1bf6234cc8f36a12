use anyhow::Result;

use super::schema::Database;

/// Preference key holding the "pro" display flag.
pub const CLEARANCE_KEY: &str = "clearance";

const CLEARANCE_GRANTED: &str = "granted";

const UPSERT_PREFERENCE: &str = "INSERT INTO user_preferences (key, value) VALUES (?, ?) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')";

impl Database {
    /// Stored value for `key`, or `None` if never set.
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM user_preferences WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    /// Insert or overwrite `key`.
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(UPSERT_PREFERENCE)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove a preference. Removing a missing key is not an error.
    pub async fn delete_preference(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Whether the "pro" display flag is set.
    pub async fn clearance_granted(&self) -> Result<bool> {
        Ok(self.get_preference(CLEARANCE_KEY).await?.as_deref() == Some(CLEARANCE_GRANTED))
    }

    /// Set or clear the "pro" display flag. Idempotent.
    pub async fn set_clearance(&self, granted: bool) -> Result<()> {
        if granted {
            self.set_preference(CLEARANCE_KEY, CLEARANCE_GRANTED).await
        } else {
            self.delete_preference(CLEARANCE_KEY).await
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_get_preference_missing() {
        let db = test_db().await;
        let value = db.get_preference("nonexistent").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_set_preference_upsert() {
        let db = test_db().await;
        db.set_preference("last_target", "adobe").await.unwrap();
        db.set_preference("last_target", "notion").await.unwrap();

        let value = db.get_preference("last_target").await.unwrap();
        assert_eq!(value, Some("notion".to_string()));
    }

    #[tokio::test]
    async fn test_delete_missing_preference_ok() {
        let db = test_db().await;
        db.delete_preference("never_set").await.unwrap();
    }
}
