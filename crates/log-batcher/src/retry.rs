// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{DEFAULT_BACKOFF_MS, DEFAULT_MAX_ATTEMPTS};
use std::time::Duration;

/// How many times a batch is sent and how long to wait between two failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStrategy {
    /// Up to `n` attempts, back to back.
    Immediate(u64),
    /// Up to `n` attempts with a constant `delay_ms` wait between two of them.
    LinearBackoff(u64, u64),
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        RetryStrategy::LinearBackoff(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF_MS)
    }
}

impl RetryStrategy {
    pub fn max_attempts(&self) -> u64 {
        match self {
            RetryStrategy::Immediate(attempts) | RetryStrategy::LinearBackoff(attempts, _) => {
                *attempts
            }
        }
    }

    pub fn backoff(&self) -> Duration {
        match self {
            RetryStrategy::Immediate(_) => Duration::ZERO,
            RetryStrategy::LinearBackoff(_, delay_ms) => Duration::from_millis(*delay_ms),
        }
    }

    /// Decision after attempt number `attempt` (1-based) failed.
    pub fn after_failure(&self, attempt: u64) -> RetryDecision {
        if attempt >= self.max_attempts() {
            RetryDecision::GiveUp
        } else {
            RetryDecision::RetryAfter(self.backoff())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_three_attempts_two_seconds_apart() {
        let strategy = RetryStrategy::default();
        assert_eq!(strategy.max_attempts(), 3);
        assert_eq!(strategy.backoff(), Duration::from_secs(2));
    }

    #[test]
    fn test_linear_backoff_is_constant() {
        let strategy = RetryStrategy::LinearBackoff(3, 2_000);
        assert_eq!(
            strategy.after_failure(1),
            RetryDecision::RetryAfter(Duration::from_secs(2))
        );
        assert_eq!(
            strategy.after_failure(2),
            RetryDecision::RetryAfter(Duration::from_secs(2))
        );
        assert_eq!(strategy.after_failure(3), RetryDecision::GiveUp);
    }

    #[test]
    fn test_immediate() {
        let strategy = RetryStrategy::Immediate(2);
        assert_eq!(
            strategy.after_failure(1),
            RetryDecision::RetryAfter(Duration::ZERO)
        );
        assert_eq!(strategy.after_failure(2), RetryDecision::GiveUp);
    }

    #[test]
    fn test_single_attempt_never_retries() {
        assert_eq!(
            RetryStrategy::LinearBackoff(1, 100).after_failure(1),
            RetryDecision::GiveUp
        );
    }
}
