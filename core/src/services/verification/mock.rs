//! Controllable collaborators for driving the verification service in tests
//!
//! Public so that crates built on top of the core (the HTTP layer in
//! particular) can pin time, script codes and observe deliveries.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::value_objects::EmailAddress;
use crate::errors::NotifyError;

use super::code_generator::CODE_MIN;
use super::traits::{Clock, CodeGenerator, Notifier};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now = *now + by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *lock(&self.now) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

/// A delivery observed by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Default)]
struct NotifierState {
    deliveries: Vec<Delivery>,
    failure: Option<NotifyError>,
    delay: Option<std::time::Duration>,
}

/// Notifier that records every delivery and can be told to fail or stall
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    state: Arc<Mutex<NotifierState>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that fails every delivery with `error`
    pub fn failing(error: NotifyError) -> Self {
        let notifier = Self::new();
        notifier.fail_with(Some(error));
        notifier
    }

    /// Fail subsequent deliveries with `error`, or succeed again with `None`
    pub fn fail_with(&self, error: Option<NotifyError>) {
        lock(&self.state).failure = error;
    }

    /// Sleep this long before answering each delivery
    pub fn stall_for(&self, delay: Option<std::time::Duration>) {
        lock(&self.state).delay = delay;
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        lock(&self.state).deliveries.clone()
    }

    pub fn delivery_count(&self) -> usize {
        lock(&self.state).deliveries.len()
    }

    /// Every code delivered to `email`, oldest first
    pub fn codes_for(&self, email: &str) -> Vec<String> {
        lock(&self.state)
            .deliveries
            .iter()
            .filter(|d| d.email == email)
            .map(|d| d.code.clone())
            .collect()
    }

    /// Most recent code delivered to `email`
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.codes_for(email).pop()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, email: &EmailAddress, code: &str) -> Result<(), NotifyError> {
        let delay = {
            let mut state = lock(&self.state);
            // Attempts are recorded even when they fail
            state.deliveries.push(Delivery {
                email: email.as_str().to_string(),
                code: code.to_string(),
            });
            state.delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match lock(&self.state).failure.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Code generator that hands out scripted codes, then counts upwards
#[derive(Debug, Clone)]
pub struct SequenceCodeGenerator {
    scripted: Arc<Mutex<VecDeque<String>>>,
    next: Arc<Mutex<u32>>,
}

impl SequenceCodeGenerator {
    pub fn new<I, C>(codes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            scripted: Arc::new(Mutex::new(codes.into_iter().map(Into::into).collect())),
            next: Arc::new(Mutex::new(CODE_MIN)),
        }
    }

    /// Generator with no script: 100000, 100001, ...
    pub fn counting() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl CodeGenerator for SequenceCodeGenerator {
    fn generate(&self) -> String {
        if let Some(code) = lock(&self.scripted).pop_front() {
            return code;
        }
        let mut next = lock(&self.next);
        let code = *next;
        *next += 1;
        code.to_string()
    }
}
