// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Number of pending records that triggers a flush
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Period of the flush timer
pub const DEFAULT_BATCH_INTERVAL: Duration = Duration::from_secs(10);

/// Hard ceiling on pending records; past it new records are dropped
pub const DEFAULT_MAX_PENDING: usize = 1_000;

/// Delivery attempts per batch, first attempt included
pub const DEFAULT_MAX_ATTEMPTS: u64 = 3;

/// Wait between two failed delivery attempts, in milliseconds
pub const DEFAULT_BACKOFF_MS: u64 = 2_000;

/// Timeout of a single delivery attempt
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Collector receiving the batches when none is configured
pub const DEFAULT_DESTINATION: &str = "http://localhost:9000";
