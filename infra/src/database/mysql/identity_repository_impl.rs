//! MySQL implementation of the IdentityRepository trait.
//!
//! Email uniqueness is enforced by the `uk_identities_email` unique key, so
//! concurrent registrations for one address cannot both succeed. Credential
//! material is written as received and never read back; deriving it is the
//! caller's concern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use vm_core::domain::entities::{Identity, NewIdentity};
use vm_core::domain::value_objects::EmailAddress;
use vm_core::errors::{DomainError, VerificationError};
use vm_core::repositories::IdentityRepository;

use super::is_duplicate_key;
use crate::InfrastructureError;

/// MySQL implementation of IdentityRepository
pub struct MySqlIdentityRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlIdentityRepository {
    /// Create a new MySQL identity repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Identity entity
    fn row_to_identity(row: &sqlx::mysql::MySqlRow) -> Result<Identity, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::store(format!("Failed to get id: {}", e)))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| DomainError::store(format!("Failed to get email: {}", e)))?;

        Ok(Identity {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::store(format!("Invalid UUID: {}", e)))?,
            email: EmailAddress::parse(&email)
                .map_err(|e| DomainError::store(format!("Invalid stored email: {}", e)))?,
            display_name: row
                .try_get("display_name")
                .map_err(|e| DomainError::store(format!("Failed to get display_name: {}", e)))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::store(format!("Failed to get created_at: {}", e)))?,
        })
    }
}

#[async_trait]
impl IdentityRepository for MySqlIdentityRepository {
    async fn create(&self, identity: NewIdentity) -> Result<Identity, DomainError> {
        let credential = identity.credential.clone();
        let created = identity.into_identity(Utc::now());

        let query = r#"
            INSERT INTO identities (id, email, display_name, credential_material, created_at)
            VALUES (?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(created.id.to_string())
            .bind(created.email.as_str())
            .bind(&created.display_name)
            .bind(credential.expose())
            .bind(created.created_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(created),
            Err(e) if is_duplicate_key(&e) => Err(VerificationError::DuplicateIdentity.into()),
            Err(e) => Err(InfrastructureError::from(e).into()),
        }
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, DomainError> {
        let query = r#"
            SELECT id, email, display_name, created_at
            FROM identities
            WHERE email = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        match result {
            Some(row) => Ok(Some(Self::row_to_identity(&row)?)),
            None => Ok(None),
        }
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM identities WHERE email = ?")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(count > 0)
    }
}
