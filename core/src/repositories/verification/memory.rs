//! In-memory verification record store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::VerificationRecord;
use crate::domain::value_objects::EmailAddress;
use crate::errors::DomainError;

use super::trait_::VerificationRecordStore;

/// Process-local store backed by a map behind an async lock.
///
/// Conditional writes are atomic because they run under the write lock.
/// Suitable for tests and single-instance development only.
#[derive(Clone, Default)]
pub struct InMemoryVerificationStore {
    records: Arc<RwLock<HashMap<EmailAddress, VerificationRecord>>>,
}

impl InMemoryVerificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VerificationRecordStore for InMemoryVerificationStore {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(email).cloned())
    }

    async fn upsert(&self, record: &VerificationRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        records.insert(record.email().clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, email: &EmailAddress) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        Ok(records.remove(email).is_some())
    }

    async fn upsert_if(
        &self,
        record: &VerificationRecord,
        expected_created_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        let current = records.get(record.email()).map(|r| r.created_at());
        if current != expected_created_at {
            return Ok(false);
        }
        records.insert(record.email().clone(), record.clone());
        Ok(true)
    }

    async fn delete_if(
        &self,
        email: &EmailAddress,
        expected_created_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        match records.get(email) {
            Some(record) if record.created_at() == expected_created_at => {
                records.remove(email);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
