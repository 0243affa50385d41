//! Main verification service implementation

use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::future::Future;
use std::sync::Arc;
use vm_shared::config::RecordRetention;
use vm_shared::utils::validation::is_valid_code;

use crate::domain::entities::{NewIdentity, PendingRegistration, VerificationRecord};
use crate::domain::value_objects::EmailAddress;
use crate::errors::{DomainError, DomainResult, ValidationError, VerificationError};
use crate::repositories::{IdentityRepository, VerificationRecordStore};

use super::clock::SystemClock;
use super::code_generator::OsRngCodeGenerator;
use super::config::VerificationServiceConfig;
use super::traits::{Clock, CodeGenerator, Notifier};
use super::types::{CodeDispatch, DispatchOutcome, VerifiedIdentity};

/// Which entry point asked for a code. Both follow the same policy; the
/// trigger only appears in logs.
#[derive(Debug, Clone, Copy)]
enum DispatchTrigger {
    Request,
    Resend,
}

impl DispatchTrigger {
    fn as_str(&self) -> &'static str {
        match self {
            DispatchTrigger::Request => "request",
            DispatchTrigger::Resend => "resend",
        }
    }
}

/// What the policy decided for one code request
#[derive(Debug)]
enum Decision {
    RateLimited(VerificationError),
    Reuse,
    Mint,
}

/// Verification service owning the code lifecycle for every email
///
/// Each operation samples the clock once and evaluates every time comparison
/// against that single `now`. The read-decide-write sequence for an email is
/// serialized through the store's conditional writes rather than an
/// in-process lock, so the guarantee holds across replicas.
pub struct VerificationService<S: ?Sized, I: ?Sized, N: ?Sized> {
    /// Verification record persistence
    store: Arc<S>,
    /// Registered identity persistence
    identities: Arc<I>,
    /// Out-of-band code delivery
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    code_generator: Arc<dyn CodeGenerator>,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl<S, I, N> VerificationService<S, I, N>
where
    S: VerificationRecordStore + ?Sized,
    I: IdentityRepository + ?Sized,
    N: Notifier + ?Sized,
{
    /// Create a new verification service using the system clock and the OS
    /// random number generator
    ///
    /// # Arguments
    ///
    /// * `store` - Verification record store implementation
    /// * `identities` - Identity repository implementation
    /// * `notifier` - Notifier used to deliver codes
    /// * `config` - Service configuration
    pub fn new(
        store: Arc<S>,
        identities: Arc<I>,
        notifier: Arc<N>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            store,
            identities,
            notifier,
            clock: Arc::new(SystemClock),
            code_generator: Arc::new(OsRngCodeGenerator),
            config,
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the code generator
    pub fn with_code_generator(mut self, code_generator: Arc<dyn CodeGenerator>) -> Self {
        self.code_generator = code_generator;
        self
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Request a verification code for an email address
    ///
    /// Mints and delivers a new code unless a code was minted for this email
    /// within the rate-limit window (`RateLimited`) or the outstanding code
    /// is still valid (delivered again, `Resent`).
    ///
    /// # Returns
    ///
    /// * `Ok(CodeDispatch)` - The code was persisted and delivered
    /// * `Err(DomainError::Verification(DeliveryFailed))` - The record was
    ///   persisted but delivery failed; the record is left in place
    /// * `Err(DomainError)` - Validation, rate limit or store failure
    pub async fn request_code(&self, email: &str) -> DomainResult<CodeDispatch> {
        self.dispatch(email, DispatchTrigger::Request).await
    }

    /// Explicitly resend a verification code
    ///
    /// Same policy and result shape as [`request_code`](Self::request_code),
    /// including minting when no record exists.
    pub async fn resend_code(&self, email: &str) -> DomainResult<CodeDispatch> {
        self.dispatch(email, DispatchTrigger::Resend).await
    }

    /// Submit a code together with the registration input
    ///
    /// This method:
    /// 1. Validates the email, code format and registration input
    /// 2. Looks up the record matching email and code (`InvalidCode` if none)
    /// 3. Rejects the code if it has expired (`CodeExpired`)
    /// 4. Creates the identity (`DuplicateIdentity` if one exists)
    /// 5. Applies the retention policy to the record
    pub async fn submit_code(
        &self,
        email: &str,
        code: &str,
        registration: PendingRegistration,
    ) -> DomainResult<VerifiedIdentity> {
        let email = EmailAddress::parse(email)?;
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "code".to_string(),
            }
            .into());
        }
        if !is_valid_code(code) {
            return Err(ValidationError::InvalidFormat {
                field: "code".to_string(),
            }
            .into());
        }

        let now = self.now();
        let record = match self.find_record(&email).await? {
            Some(record) if record.matches_code(code) => record,
            _ => {
                tracing::info!(
                    email = %email.masked(),
                    event = "code_invalid",
                    "Submitted verification code does not match"
                );
                return Err(VerificationError::InvalidCode.into());
            }
        };

        if record.is_expired_at(now) {
            tracing::info!(
                email = %email.masked(),
                expired_at = %record.expired_at(),
                event = "code_expired",
                "Submitted verification code has expired"
            );
            return Err(VerificationError::CodeExpired.into());
        }

        let new_identity = NewIdentity::from_registration(email.clone(), registration);
        let identity = self
            .with_store_timeout("identity.create", self.identities.create(new_identity))
            .await?;

        tracing::info!(
            email = %email.masked(),
            identity_id = %identity.id,
            event = "identity_created",
            "Email verified and identity created"
        );

        if self.config.retention == RecordRetention::Consume {
            self.consume(&record).await;
        }

        Ok(VerifiedIdentity {
            identity_id: identity.id,
            email: identity.email,
        })
    }

    /// Shared policy behind request and resend
    async fn dispatch(&self, email: &str, trigger: DispatchTrigger) -> DomainResult<CodeDispatch> {
        let email = EmailAddress::parse(email)?;
        let now = self.now();
        let mut conflicts = 0u32;

        loop {
            let current = self.find_record(&email).await?;

            match self.decide(current.as_ref(), now) {
                Decision::RateLimited(err) => {
                    tracing::warn!(
                        email = %email.masked(),
                        trigger = trigger.as_str(),
                        error = %err,
                        event = "rate_limited",
                        "Verification code request rate limited"
                    );
                    return Err(err.into());
                }
                Decision::Reuse => {
                    // The policy only picks Reuse for an existing record
                    let record = current.ok_or_else(|| DomainError::Internal {
                        message: "reuse decided without a record".to_string(),
                    })?;
                    self.deliver(&record).await?;
                    tracing::info!(
                        email = %email.masked(),
                        trigger = trigger.as_str(),
                        expired_at = %record.expired_at(),
                        event = "code_resent",
                        "Re-delivered outstanding verification code"
                    );
                    return Ok(self.dispatch_result(DispatchOutcome::Resent, &record, now));
                }
                Decision::Mint => {
                    let expected = current.as_ref().map(|r| r.created_at());
                    let record = VerificationRecord::mint(
                        email.clone(),
                        self.code_generator.generate(),
                        now,
                        self.config.validity_window,
                    );

                    let written = self
                        .with_store_timeout("verification.upsert_if", self.store.upsert_if(&record, expected))
                        .await?;

                    if written {
                        tracing::info!(
                            email = %email.masked(),
                            trigger = trigger.as_str(),
                            expired_at = %record.expired_at(),
                            event = "code_issued",
                            "Minted new verification code"
                        );
                        self.deliver(&record).await?;
                        return Ok(self.dispatch_result(DispatchOutcome::Issued, &record, now));
                    }

                    conflicts += 1;
                    tracing::warn!(
                        email = %email.masked(),
                        conflicts = conflicts,
                        event = "cas_conflict",
                        "Concurrent writer changed the verification record"
                    );
                    if conflicts > self.config.max_cas_retries {
                        return Err(self.conflict_exhausted(&email, now).await);
                    }
                }
            }
        }
    }

    /// Pure policy over the current record
    fn decide(&self, current: Option<&VerificationRecord>, now: DateTime<Utc>) -> Decision {
        let Some(record) = current else {
            return Decision::Mint;
        };

        if record.elapsed_since_mint(now) < self.config.rate_limit_window {
            return Decision::RateLimited(self.rate_limited(record, now));
        }
        if record.is_valid_at(now) {
            return Decision::Reuse;
        }
        Decision::Mint
    }

    /// Rate-limit rejection reporting the time left until the next mint,
    /// rounded up to whole minutes (and whole seconds)
    fn rate_limited(&self, record: &VerificationRecord, now: DateTime<Utc>) -> VerificationError {
        let remaining = self.config.rate_limit_window - record.elapsed_since_mint(now);
        let remaining_ms = remaining.num_milliseconds().max(1);

        VerificationError::RateLimited {
            retry_after_minutes: ceil_div(remaining_ms, 60_000) as u32,
            retry_after_seconds: ceil_div(remaining_ms, 1_000) as u64,
        }
    }

    /// Outcome after too many lost conditional writes: report the winner's
    /// rate limit, or a store error if the record keeps disappearing
    async fn conflict_exhausted(&self, email: &EmailAddress, now: DateTime<Utc>) -> DomainError {
        match self.find_record(email).await {
            Ok(Some(record)) => self.rate_limited(&record, now).into(),
            Ok(None) => DomainError::store("verification record changed concurrently"),
            Err(err) => err,
        }
    }

    fn dispatch_result(
        &self,
        outcome: DispatchOutcome,
        record: &VerificationRecord,
        now: DateTime<Utc>,
    ) -> CodeDispatch {
        let next_request_at = record.created_at() + self.config.rate_limit_window;
        CodeDispatch {
            outcome,
            expires_at: record.expired_at(),
            next_request_at,
            expires_in: non_negative(record.expired_at() - now),
            retry_after: non_negative(next_request_at - now),
        }
    }

    /// Deliver the record's code under the delivery deadline. The record is
    /// already persisted and stays so whatever happens here.
    async fn deliver(&self, record: &VerificationRecord) -> DomainResult<()> {
        let email = record.email();
        let result = tokio::time::timeout(
            self.config.delivery_timeout,
            self.notifier.deliver(email, record.code()),
        )
        .await;

        let reason = match result {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!(
                "delivery timed out after {}ms",
                self.config.delivery_timeout.as_millis()
            ),
        };

        tracing::error!(
            email = %email.masked(),
            reason = %reason,
            event = "delivery_failed",
            "Failed to deliver verification code"
        );
        Err(VerificationError::DeliveryFailed { reason }.into())
    }

    /// Delete a verified record unless it has been re-minted meanwhile.
    /// Failure here does not undo the verification.
    async fn consume(&self, record: &VerificationRecord) {
        let email = record.email();
        let result = self
            .with_store_timeout(
                "verification.delete_if",
                self.store.delete_if(email, record.created_at()),
            )
            .await;

        match result {
            Ok(true) => tracing::info!(
                email = %email.masked(),
                event = "record_consumed",
                "Verification record consumed"
            ),
            Ok(false) => tracing::warn!(
                email = %email.masked(),
                event = "cas_conflict",
                "Verification record was replaced before it could be consumed"
            ),
            Err(err) => tracing::warn!(
                email = %email.masked(),
                error = %err,
                event = "consume_failed",
                "Failed to consume verification record"
            ),
        }
    }

    async fn find_record(&self, email: &EmailAddress) -> DomainResult<Option<VerificationRecord>> {
        self.with_store_timeout("verification.find_by_email", self.store.find_by_email(email))
            .await
    }

    async fn with_store_timeout<T, F>(&self, operation: &'static str, fut: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    operation = operation,
                    timeout_ms = self.config.store_timeout.as_millis() as u64,
                    event = "store_timeout",
                    "Store call exceeded its deadline"
                );
                Err(DomainError::Timeout {
                    operation: operation.to_string(),
                })
            }
        }
    }

    /// Sample the clock. Truncated to milliseconds, the precision every store
    /// keeps, so a `created_at` read back compares equal to the one written.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }
}

fn ceil_div(value: i64, unit: i64) -> i64 {
    ((value + unit - 1) / unit).max(1)
}

fn non_negative(duration: Duration) -> Duration {
    duration.max(Duration::zero())
}
