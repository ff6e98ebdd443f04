// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for the batching engine

use reqwest::StatusCode;

/// Error produced when building a buffer or an engine from an invalid configuration.
#[derive(Debug, thiserror::Error)]
pub enum Creation {
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
    #[error("batch interval must be greater than zero")]
    ZeroBatchInterval,
    #[error("max pending ({max_pending}) must be at least the batch size ({batch_size})")]
    MaxPendingBelowBatchSize { max_pending: usize, batch_size: usize },
    #[error("retry strategy must allow at least one attempt")]
    NoAttempts,
    #[error("invalid destination address {0:?}: {1}")]
    Destination(String, String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Error returned when a record is not admitted into the buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Insert {
    #[error("buffer saturated at {max_pending} pending records, entry dropped")]
    Saturated { max_pending: usize },
    #[error("engine stopped, entry dropped")]
    Stopped,
}

/// Failure to get a batch to the destination.
#[derive(Debug, thiserror::Error)]
pub enum Shipping {
    /// The batch could not be encoded. Retrying will not help.
    #[error("failed to serialize batch: {0}")]
    Payload(#[from] serde_json::Error),
    /// The destination rejected or never received the batch after every attempt.
    #[error("destination error (status {0:?}): {1}")]
    Destination(Option<StatusCode>, String),
}

/// Terminal error of the engine run loop.
#[derive(Debug, thiserror::Error)]
pub enum Engine {
    #[error("batch of {size} records could not be delivered after {attempts} attempts")]
    DeliveryExhausted { size: usize, attempts: u64 },
}
