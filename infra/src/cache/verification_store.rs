//! Redis-backed verification record store
//!
//! Each record lives in one hash under `verification:record:{sha256(email)}`
//! with the fields `email`, `code`, `created_at_ms` and `expired_at_ms`.
//! Every write replaces all four fields together and refreshes the key's TTL.
//! Conditional writes run as Lua scripts so the compare and the write happen
//! in one atomic step on the server.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::{AsyncCommands, Script};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;

use vm_core::domain::entities::VerificationRecord;
use vm_core::domain::value_objects::EmailAddress;
use vm_core::errors::DomainError;
use vm_core::repositories::VerificationRecordStore;
use vm_shared::utils::validation::mask_email;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

const FIELD_EMAIL: &str = "email";
const FIELD_CODE: &str = "code";
const FIELD_CREATED_AT: &str = "created_at_ms";
const FIELD_EXPIRED_AT: &str = "expired_at_ms";

/// KEYS[1] record key
/// ARGV[1] expected created_at_ms, empty when the record must be absent
/// ARGV[2..5] email, code, created_at_ms, expired_at_ms
/// ARGV[6] ttl in milliseconds
const UPSERT_IF_SCRIPT: &str = r#"
local current = redis.call('HGET', KEYS[1], 'created_at_ms')
if ARGV[1] == '' then
  if current then return 0 end
elseif current ~= ARGV[1] then
  return 0
end
redis.call('DEL', KEYS[1])
redis.call('HSET', KEYS[1], 'email', ARGV[2], 'code', ARGV[3], 'created_at_ms', ARGV[4], 'expired_at_ms', ARGV[5])
redis.call('PEXPIRE', KEYS[1], ARGV[6])
return 1
"#;

/// KEYS[1] record key, ARGV[1] expected created_at_ms
const DELETE_IF_SCRIPT: &str = r#"
if redis.call('HGET', KEYS[1], 'created_at_ms') == ARGV[1] then
  return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Verification record store on Redis
pub struct RedisVerificationStore {
    client: RedisClient,
    /// Lifetime of a record key, at least the longer of the two windows
    record_ttl: Duration,
    upsert_if_script: Script,
    delete_if_script: Script,
}

impl RedisVerificationStore {
    /// Create a new store
    ///
    /// # Arguments
    /// * `client` - Connected Redis client
    /// * `record_ttl` - How long an untouched record is kept; use the longer
    ///   of the rate-limit and validity windows
    pub fn new(client: RedisClient, record_ttl: Duration) -> Self {
        Self {
            client,
            record_ttl,
            upsert_if_script: Script::new(UPSERT_IF_SCRIPT),
            delete_if_script: Script::new(DELETE_IF_SCRIPT),
        }
    }

    /// Cache key for an email. The address is hashed so it never appears in
    /// the keyspace.
    pub fn record_key(&self, email: &EmailAddress) -> String {
        self.client.make_key(&record_key_suffix(email))
    }

    fn ttl_ms(&self) -> u64 {
        (self.record_ttl.as_millis() as u64).max(1)
    }
}

pub(crate) fn record_key_suffix(email: &EmailAddress) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_str().as_bytes());
    format!("verification:record:{:x}", hasher.finalize())
}

/// Field/value pairs written for a record
pub(crate) fn record_fields(record: &VerificationRecord) -> [(&'static str, String); 4] {
    [
        (FIELD_EMAIL, record.email().as_str().to_string()),
        (FIELD_CODE, record.code().to_string()),
        (FIELD_CREATED_AT, record.created_at().timestamp_millis().to_string()),
        (FIELD_EXPIRED_AT, record.expired_at().timestamp_millis().to_string()),
    ]
}

/// Rebuild a record from `HGETALL` output; an empty hash means no record
pub(crate) fn record_from_fields(
    email: &EmailAddress,
    fields: &HashMap<String, String>,
) -> Result<Option<VerificationRecord>, InfrastructureError> {
    if fields.is_empty() {
        return Ok(None);
    }

    let code = fields
        .get(FIELD_CODE)
        .ok_or_else(|| InfrastructureError::Serialization("record without code".to_string()))?;
    let created_at = millis_field(fields, FIELD_CREATED_AT)?;
    let expired_at = millis_field(fields, FIELD_EXPIRED_AT)?;

    Ok(Some(VerificationRecord::restore(
        email.clone(),
        code.clone(),
        created_at,
        expired_at,
    )))
}

fn millis_field(
    fields: &HashMap<String, String>,
    name: &str,
) -> Result<DateTime<Utc>, InfrastructureError> {
    let raw = fields
        .get(name)
        .ok_or_else(|| InfrastructureError::Serialization(format!("record without {}", name)))?;
    let millis: i64 = raw
        .parse()
        .map_err(|_| InfrastructureError::Serialization(format!("invalid {}: {}", name, raw)))?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| InfrastructureError::Serialization(format!("out of range {}", name)))
}

#[async_trait]
impl VerificationRecordStore for RedisVerificationStore {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        let key = self.record_key(email);
        let fields: HashMap<String, String> = self
            .client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.hgetall(key).await })
            })
            .await
            .map_err(InfrastructureError::from)?;

        let record = record_from_fields(email, &fields).map_err(|e| {
            tracing::error!(
                email = %mask_email(email.as_str()),
                error = %e,
                "Corrupt verification record in Redis"
            );
            e
        })?;
        Ok(record)
    }

    async fn upsert(&self, record: &VerificationRecord) -> Result<(), DomainError> {
        let key = self.record_key(record.email());
        let mut conn = self.client.connection();

        redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &record_fields(record))
            .ignore()
            .pexpire(&key, self.ttl_ms() as i64)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(())
    }

    async fn delete(&self, email: &EmailAddress) -> Result<bool, DomainError> {
        let key = self.record_key(email);
        let removed: i64 = self
            .client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del(key).await })
            })
            .await
            .map_err(InfrastructureError::from)?;
        Ok(removed > 0)
    }

    async fn upsert_if(
        &self,
        record: &VerificationRecord,
        expected_created_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DomainError> {
        let key = self.record_key(record.email());
        let expected = expected_created_at
            .map(|t| t.timestamp_millis().to_string())
            .unwrap_or_default();
        let [(_, email), (_, code), (_, created_at), (_, expired_at)] = record_fields(record);
        let mut conn = self.client.connection();

        let applied: i64 = self
            .upsert_if_script
            .key(&key)
            .arg(expected)
            .arg(email)
            .arg(code)
            .arg(created_at)
            .arg(expired_at)
            .arg(self.ttl_ms())
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(applied == 1)
    }

    async fn delete_if(
        &self,
        email: &EmailAddress,
        expected_created_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let key = self.record_key(email);
        let mut conn = self.client.connection();

        let removed: i64 = self
            .delete_if_script
            .key(&key)
            .arg(expected_created_at.timestamp_millis().to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        Ok(removed > 0)
    }
}
