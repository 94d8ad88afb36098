//! Key-value repository implementation

use libsql::Connection;

use crate::error::Result;
use crate::storage::KeyValueStore;

/// libSQL implementation of `KeyValueStore`
pub struct LibSqlKeyValueRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlKeyValueRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for LibSqlKeyValueRepository<'_> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM kv_store WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
                libsql::params![key, value, chrono::Utc::now().timestamp()],
            )
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?", [key])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_key_reads_as_none() {
        let db = setup().await;
        let repo = LibSqlKeyValueRepository::new(db.connection());

        assert_eq!(repo.get("@users").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_set_overwrites_value() {
        let db = setup().await;
        let repo = LibSqlKeyValueRepository::new(db.connection());

        repo.set("@currentUser", r#"{"id":"1","name":"A"}"#)
            .await
            .unwrap();
        repo.set("@currentUser", r#"{"id":"2","name":"B"}"#)
            .await
            .unwrap();

        assert_eq!(
            repo.get("@currentUser").await.unwrap().as_deref(),
            Some(r#"{"id":"2","name":"B"}"#)
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_remove_deletes_only_that_key() {
        let db = setup().await;
        let repo = LibSqlKeyValueRepository::new(db.connection());

        repo.set("@users", "[]").await.unwrap();
        repo.set("@currentUser", "{}").await.unwrap();
        repo.remove("@currentUser").await.unwrap();

        assert_eq!(repo.get("@currentUser").await.unwrap(), None);
        assert_eq!(repo.get("@users").await.unwrap().as_deref(), Some("[]"));
    }
}
