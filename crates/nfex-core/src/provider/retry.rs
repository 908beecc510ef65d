//! Backoff policy and per-attempt outcomes for endpoint probing.

use std::time::Duration;

use rand::Rng;

use crate::models::config::ProviderConfig;

/// Exponential backoff with random jitter: attempt `n` waits
/// `base * 2^(n-1) + uniform(0..=jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub jitter_ms: u64,
}

impl RetryPolicy {
    const MAX_SHIFT: u32 = 16;

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            jitter_ms: config.jitter_ms,
        }
    }

    /// Deterministic part of the delay after failed attempt `attempt` (1-based).
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(Self::MAX_SHIFT);
        Duration::from_millis(self.base_delay_ms.saturating_mul(1u64 << shift))
    }

    /// Full delay including jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.jitter_ms)
        };
        self.base_delay(attempt) + Duration::from_millis(jitter)
    }
}

/// Why a single request did not produce a usable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttemptError {
    /// 404: move on to the next endpoint without retrying.
    NotFound,
    /// 401: credentials are wrong, stop probing.
    Unauthorized,
    /// Anything else: retry with backoff.
    Transient(String),
}
