// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use log_batcher::errors as batcher;

/// Invalid environment configuration.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("MAX_PENDING ({max_pending}) must be at least BATCH_SIZE ({batch_size})")]
    MaxPendingBelowBatchSize { max_pending: usize, batch_size: usize },
    #[error("Invalid log level '{0}'. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Errors that end the receiver.
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize logging: {0}")]
    Logger(String),

    #[error("Failed to create batching engine: {0}")]
    Engine(#[from] batcher::Creation),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] batcher::Engine),

    #[error("Batching engine task terminated unexpectedly: {0}")]
    EngineTask(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ConfigError::InvalidValue {
            key: "BATCH_SIZE",
            value: "five".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            error.to_string(),
            r#"Invalid value "five" for BATCH_SIZE: invalid digit found in string"#
        );

        let error = ReceiverError::from(ConfigError::Zero("BATCH_INTERVAL"));
        assert_eq!(
            error.to_string(),
            "Invalid configuration: BATCH_INTERVAL must be greater than zero"
        );
    }

    #[test]
    fn test_delivery_error_display() {
        let error = ReceiverError::from(batcher::Engine::DeliveryExhausted {
            size: 5,
            attempts: 3,
        });
        assert_eq!(
            error.to_string(),
            "Delivery failed: batch of 5 records could not be delivered after 3 attempts"
        );
    }
}
