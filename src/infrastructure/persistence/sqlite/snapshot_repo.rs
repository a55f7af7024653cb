//! SQLite Snapshot Repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{
    ChapterRecord, RepositoryError, SnapshotKey, SnapshotStorePort, StoredSnapshot, MAX_REVISION,
};

/// SQLite Snapshot Repository
pub struct SqliteSnapshotRepository {
    pool: DbPool,
}

impl SqliteSnapshotRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn stored_revision(&self, key: &SnapshotKey) -> Result<Option<u64>, RepositoryError> {
        let revision: Option<i64> = sqlx::query_scalar(
            "SELECT revision FROM book_snapshots WHERE user_id = ? AND book_id = ?",
        )
        .bind(&key.user_id)
        .bind(&key.book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        revision.map(revision_from_db).transpose()
    }
}

fn revision_to_db(revision: u64) -> Result<i64, RepositoryError> {
    i64::try_from(revision).map_err(|_| {
        RepositoryError::SerializationError(format!("revision {} exceeds {}", revision, MAX_REVISION))
    })
}

fn revision_from_db(revision: i64) -> Result<u64, RepositoryError> {
    u64::try_from(revision)
        .map_err(|_| RepositoryError::SerializationError(format!("negative revision {} in database", revision)))
}

#[derive(FromRow)]
struct SnapshotRow {
    revision: i64,
    payload: String,
}

impl TryFrom<SnapshotRow> for StoredSnapshot {
    type Error = RepositoryError;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        let chapters: Vec<ChapterRecord> = serde_json::from_str(&row.payload)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        Ok(StoredSnapshot {
            revision: revision_from_db(row.revision)?,
            chapters,
        })
    }
}

#[async_trait]
impl SnapshotStorePort for SqliteSnapshotRepository {
    async fn load_snapshot(&self, key: &SnapshotKey) -> Result<Option<StoredSnapshot>, RepositoryError> {
        let row: Option<SnapshotRow> = sqlx::query_as(
            "SELECT revision, payload FROM book_snapshots WHERE user_id = ? AND book_id = ?",
        )
        .bind(&key.user_id)
        .bind(&key.book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(StoredSnapshot::try_from).transpose()
    }

    async fn save_snapshot(&self, key: &SnapshotKey, snapshot: &StoredSnapshot) -> Result<(), RepositoryError> {
        let revision = revision_to_db(snapshot.revision)?;
        let payload = serde_json::to_string(&snapshot.chapters)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        // 只有更新的 revision 才能覆盖已有行
        let result = sqlx::query(
            r#"
            INSERT INTO book_snapshots (user_id, book_id, revision, payload, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, book_id) DO UPDATE SET
                revision = excluded.revision,
                payload = excluded.payload,
                updated_at = excluded.updated_at
            WHERE excluded.revision > book_snapshots.revision
            "#,
        )
        .bind(&key.user_id)
        .bind(&key.book_id)
        .bind(revision)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            let stored = self.stored_revision(key).await?.unwrap_or_default();
            return Err(RepositoryError::Stale {
                key: key.to_string(),
                revision: snapshot.revision,
                stored,
            });
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
