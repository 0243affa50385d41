//! In-memory identity repository

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{Identity, NewIdentity};
use crate::domain::value_objects::EmailAddress;
use crate::errors::{DomainError, VerificationError};

use super::trait_::IdentityRepository;

/// Identity repository kept in process memory
#[derive(Clone, Default)]
pub struct InMemoryIdentityRepository {
    identities: Arc<RwLock<HashMap<EmailAddress, Identity>>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.identities.read().await.len()
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn create(&self, identity: NewIdentity) -> Result<Identity, DomainError> {
        let mut identities = self.identities.write().await;

        if identities.contains_key(&identity.email) {
            return Err(VerificationError::DuplicateIdentity.into());
        }

        let created = identity.into_identity(Utc::now());
        identities.insert(created.email.clone(), created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, DomainError> {
        let identities = self.identities.read().await;
        Ok(identities.get(email).cloned())
    }
}
