//! MySQL implementation of the VerificationRecordStore trait.
//!
//! One row per email in `verification_records`. Conditional writes are single
//! statements whose `WHERE` clause carries the expected `created_at`, so the
//! compare and the write are one atomic step in InnoDB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use vm_core::domain::entities::VerificationRecord;
use vm_core::domain::value_objects::EmailAddress;
use vm_core::errors::DomainError;
use vm_core::repositories::VerificationRecordStore;

use super::is_duplicate_key;
use crate::InfrastructureError;

/// MySQL implementation of VerificationRecordStore
pub struct MySqlVerificationStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerificationStore {
    /// Create a new MySQL verification record store
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Delete every record minted before `cutoff`
    ///
    /// Redis expires records on its own; MySQL needs this called periodically
    /// with a cutoff at least the longer of the two windows in the past.
    ///
    /// # Returns
    /// Number of rows removed
    pub async fn purge_minted_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM verification_records WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::debug!(purged, "Purged stale verification records");
        }
        Ok(purged)
    }

    /// Convert database row to VerificationRecord
    fn row_to_record(
        email: &EmailAddress,
        row: &sqlx::mysql::MySqlRow,
    ) -> Result<VerificationRecord, DomainError> {
        let code: String = row
            .try_get("code")
            .map_err(|e| DomainError::store(format!("Failed to get code: {}", e)))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| DomainError::store(format!("Failed to get created_at: {}", e)))?;
        let expired_at: DateTime<Utc> = row
            .try_get("expired_at")
            .map_err(|e| DomainError::store(format!("Failed to get expired_at: {}", e)))?;

        Ok(VerificationRecord::restore(
            email.clone(),
            code,
            created_at,
            expired_at,
        ))
    }
}

#[async_trait]
impl VerificationRecordStore for MySqlVerificationStore {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let query = r#"
            SELECT code, created_at, expired_at
            FROM verification_records
            WHERE email = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(email, &row)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: &VerificationRecord) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO verification_records (email, code, created_at, expired_at)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                code = VALUES(code),
                created_at = VALUES(created_at),
                expired_at = VALUES(expired_at)
        "#;

        sqlx::query(query)
            .bind(record.email().as_str())
            .bind(record.code())
            .bind(record.created_at())
            .bind(record.expired_at())
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(())
    }

    async fn delete(&self, email: &EmailAddress) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM verification_records WHERE email = ?")
            .bind(email.as_str())
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_if(
        &self,
        record: &VerificationRecord,
        expected_created_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DomainError> {
        let Some(expected) = expected_created_at else {
            // Plain insert: the primary key rejects it if a row already exists
            let inserted = sqlx::query(
                "INSERT INTO verification_records (email, code, created_at, expired_at) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(record.email().as_str())
            .bind(record.code())
            .bind(record.created_at())
            .bind(record.expired_at())
            .execute(&self.pool)
            .await;

            return match inserted {
                Ok(result) => Ok(result.rows_affected() == 1),
                Err(e) if is_duplicate_key(&e) => Ok(false),
                Err(e) => Err(InfrastructureError::from(e).into()),
            };
        };

        let query = r#"
            UPDATE verification_records
            SET code = ?, created_at = ?, expired_at = ?
            WHERE email = ? AND created_at = ?
        "#;

        let result = sqlx::query(query)
            .bind(record.code())
            .bind(record.created_at())
            .bind(record.expired_at())
            .bind(record.email().as_str())
            .bind(expected)
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_if(
        &self,
        email: &EmailAddress,
        expected_created_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result =
            sqlx::query("DELETE FROM verification_records WHERE email = ? AND created_at = ?")
                .bind(email.as_str())
                .bind(expected_created_at)
                .execute(&self.pool)
                .await
                .map_err(InfrastructureError::from)?;

        Ok(result.rows_affected() > 0)
    }
}
