//! # Unknown-Barcode Repository
//!
//! Log of scan payloads that matched no product. The back office reviews
//! the unresolved entries to find products missing from the catalog.
//!
//! Writes happen fire-and-forget from the scan router: a failed insert is
//! logged and swallowed so a slow disk can never stall the scan pipeline.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// A logged scan that matched no catalog product.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnknownCode {
    pub id: String,
    pub payload: String,
    pub scanned_at: DateTime<Utc>,
    pub resolved: bool,
}

/// Repository for the unknown-barcode log.
#[derive(Debug, Clone)]
pub struct UnknownCodeRepository {
    pool: SqlitePool,
}

impl UnknownCodeRepository {
    /// Creates a new UnknownCodeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UnknownCodeRepository { pool }
    }

    /// Records an unmatched scan payload.
    ///
    /// Every occurrence is logged, duplicates included; the review screen
    /// groups by payload so repeat frequency is visible.
    pub async fn record(&self, payload: &str, scanned_at: DateTime<Utc>) -> DbResult<()> {
        let id = Uuid::new_v4().to_string();

        debug!(payload = %payload, "Recording unknown barcode");

        sqlx::query(
            r#"
            INSERT INTO unknown_barcodes (id, payload, scanned_at, resolved)
            VALUES (?1, ?2, ?3, 0)
            "#,
        )
        .bind(&id)
        .bind(payload)
        .bind(scanned_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists unresolved entries, oldest first.
    pub async fn list_unresolved(&self, limit: i64) -> DbResult<Vec<UnknownCode>> {
        let codes = sqlx::query_as::<_, UnknownCode>(
            r#"
            SELECT id, payload, scanned_at, resolved
            FROM unknown_barcodes
            WHERE resolved = 0
            ORDER BY scanned_at
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    /// Marks every entry for a payload as resolved.
    ///
    /// Called when the missing product has been added to the catalog.
    pub async fn resolve(&self, payload: &str) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE unknown_barcodes SET resolved = 1 WHERE payload = ?1 AND resolved = 0",
        )
        .bind(payload)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Unknown barcode", payload));
        }

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let db = test_db().await;
        let repo = db.unknown_codes();

        repo.record("999000111", Utc::now()).await.unwrap();
        repo.record("999000111", Utc::now()).await.unwrap();
        repo.record("888000222", Utc::now()).await.unwrap();

        // Duplicates are kept as separate occurrences.
        let unresolved = repo.list_unresolved(10).await.unwrap();
        assert_eq!(unresolved.len(), 3);
        assert_eq!(unresolved[0].payload, "999000111");
        assert!(!unresolved[0].resolved);
    }

    #[tokio::test]
    async fn test_resolve_clears_all_occurrences() {
        let db = test_db().await;
        let repo = db.unknown_codes();

        repo.record("999000111", Utc::now()).await.unwrap();
        repo.record("999000111", Utc::now()).await.unwrap();
        repo.record("888000222", Utc::now()).await.unwrap();

        let resolved = repo.resolve("999000111").await.unwrap();
        assert_eq!(resolved, 2);

        let unresolved = repo.list_unresolved(10).await.unwrap();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].payload, "888000222");

        assert!(matches!(
            repo.resolve("999000111").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
