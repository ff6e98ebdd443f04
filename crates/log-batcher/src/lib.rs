// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory batching and delivery of event records.
//!
//! Producers push already-validated records through an [`engine::EngineHandle`]. A single
//! [`engine::BatchingEngine`] task drains the shared [`buffer::BatchBuffer`] whenever the
//! [`scheduler::FlushScheduler`] fires (size threshold, flush interval or shutdown), serializes
//! the batch to a JSON array and ships it through a [`client::DeliveryClient`] under a
//! [`retry::RetryStrategy`].

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod buffer;
pub mod client;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod flusher;
pub mod retry;
pub mod scheduler;

#[cfg(test)]
mod testing;
