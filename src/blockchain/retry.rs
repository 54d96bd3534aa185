// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Retry Policy
//!
//! Bounded retry with exponential backoff for idempotent RPC reads.
//!
//! Broadcast calls (`eth_sendRawTransaction`, Tezos injection) never go
//! through [`execute_with_retry`]; a duplicate broadcast is worse than a
//! failed one.
//!
//! A [`RetryPolicy`] is immutable once built and is shared by `Arc` across
//! every client created from the same configuration.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::warn;

/// Errors that can tell whether another attempt might succeed.
pub trait Retryable {
    /// Returns true if the failure is transient.
    fn is_retryable(&self) -> bool;
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier applied per retry.
    pub backoff_multiplier: f64,
    /// Jitter factor (0.0-1.0).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 200,
            max_delay_ms: 5_000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt count and first delay,
    /// keeping the default backoff shape.
    #[must_use]
    pub fn new(max_retries: u32, initial_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay_ms,
            ..Default::default()
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// `min(initial_delay * multiplier^attempt, max_delay)`, attempt is 0-indexed.
    #[must_use]
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);
        Duration::from_millis(capped_delay as u64)
    }

    /// [`calculate_delay`](Self::calculate_delay) shortened by up to `jitter_factor`.
    #[must_use]
    pub fn calculate_delay_with_jitter(&self, attempt: u32) -> Duration {
        let base_delay = self.calculate_delay(attempt);
        if self.jitter_factor <= 0.0 {
            return base_delay;
        }

        let jitter: f64 = rand::rng().random();
        let jitter_multiplier = 1.0 - (self.jitter_factor.clamp(0.0, 1.0) * jitter);
        let jittered_ms = base_delay.as_millis() as f64 * jitter_multiplier;
        Duration::from_millis(jittered_ms.max(1.0) as u64)
    }

    #[must_use]
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made <= self.max_retries
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the policy is exhausted. The last error is returned unchanged.
pub async fn execute_with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let mut attempts = 0u32;

    loop {
        attempts = attempts.saturating_add(1);

        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if !error.is_retryable() || !policy.should_retry(attempts) {
                    return Err(error);
                }

                let delay = policy.calculate_delay_with_jitter(attempts - 1);
                warn!(
                    operation = operation_name,
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "RPC read failed, retrying"
                );
                sleep(delay).await;
            }
        }
    }
}
