//! Retry policy for version-checked document writes.
//!
//! Only `StoreError::VersionConflict` is worth retrying: the caller re-reads
//! the document, recomputes the transition against fresh state, and writes
//! again. Everything else propagates immediately.

use std::time::Duration;

use crate::store::StoreError;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Exponential backoff for the given zero-based attempt, capped at
    /// `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    pub fn should_retry(&self, error: &StoreError, attempt: u32) -> bool {
        error.is_conflict() && attempt + 1 < self.max_attempts
    }
}
