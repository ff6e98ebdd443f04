// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::client::{AttemptOutcome, DeliveryClient};
use crate::errors;
use crate::retry::{RetryDecision, RetryStrategy};
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// What the engine does with a batch that failed every delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExhaustionPolicy {
    /// Stop the engine with [`errors::Engine::DeliveryExhausted`]; the owning process exits.
    #[default]
    Exit,
    /// Drop the batch and keep running.
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based
    pub attempt: u64,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

/// Summary of a successful delivery.
#[derive(Debug, Clone)]
pub struct ShipReport {
    pub status: StatusCode,
    pub attempts: Vec<AttemptRecord>,
    /// Attempts and backoff waits included
    pub elapsed: Duration,
}

pub struct FlusherConfig {
    pub client: Arc<dyn DeliveryClient>,
    pub retry_strategy: RetryStrategy,
    pub on_exhausted: ExhaustionPolicy,
}

#[derive(Clone)]
pub struct Flusher {
    client: Arc<dyn DeliveryClient>,
    retry_strategy: RetryStrategy,
    on_exhausted: ExhaustionPolicy,
}

impl Flusher {
    pub fn new(config: FlusherConfig) -> Self {
        Flusher {
            client: config.client,
            retry_strategy: config.retry_strategy,
            on_exhausted: config.on_exhausted,
        }
    }

    /// Encodes a batch as a JSON array, records in order.
    pub fn serialize<R: Serialize>(batch: &[R]) -> Result<Vec<u8>, errors::Shipping> {
        Ok(serde_json::to_vec(batch)?)
    }

    /// Sends `payload` until it is accepted or the retry strategy gives up.
    pub async fn ship(&self, payload: &[u8]) -> Result<ShipReport, errors::Shipping> {
        let start = Instant::now();
        let mut attempts = Vec::new();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let attempt_start = Instant::now();
            let outcome = self.client.send(payload).await;
            let elapsed = attempt_start.elapsed();

            if let AttemptOutcome::Delivered(status) = outcome {
                attempts.push(AttemptRecord {
                    attempt,
                    outcome,
                    elapsed,
                });
                return Ok(ShipReport {
                    status,
                    attempts,
                    elapsed: start.elapsed(),
                });
            }

            warn!(attempt, error = %outcome, duration = ?elapsed, "Delivery attempt failed");
            let status = outcome.status();
            let reason = outcome.to_string();
            attempts.push(AttemptRecord {
                attempt,
                outcome,
                elapsed,
            });

            match self.retry_strategy.after_failure(attempt) {
                RetryDecision::RetryAfter(delay) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                RetryDecision::GiveUp => {
                    return Err(errors::Shipping::Destination(
                        status,
                        format!("Failed to send request after {attempt} attempts: {reason}"),
                    ));
                }
            }
        }
    }

    /// Serializes and ships one batch. Only an exhausted batch under
    /// [`ExhaustionPolicy::Exit`] is an error.
    pub async fn flush<R: Serialize>(&self, batch: Vec<R>) -> Result<(), errors::Engine> {
        if batch.is_empty() {
            return Ok(());
        }
        let size = batch.len();

        let payload = match Self::serialize(&batch) {
            Ok(payload) => payload,
            Err(e) => {
                error!(size, error = %e, "Failed to serialize batch");
                return Ok(());
            }
        };
        debug!(size, bytes = payload.len(), "Shipping batch");

        match self.ship(&payload).await {
            Ok(report) => {
                info!(
                    size,
                    status = report.status.as_u16(),
                    attempts = report.attempts.len(),
                    duration = ?report.elapsed,
                    "Batch delivered"
                );
                Ok(())
            }
            Err(e) => {
                let attempts = self.retry_strategy.max_attempts();
                error!(
                    size,
                    attempts,
                    policy = ?self.on_exhausted,
                    error = %e,
                    "Batch delivery exhausted retries"
                );
                match self.on_exhausted {
                    ExhaustionPolicy::Exit => {
                        Err(errors::Engine::DeliveryExhausted { size, attempts })
                    }
                    ExhaustionPolicy::Drop => Ok(()),
                }
            }
        }
    }
}
