// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::buffer::BatchBuffer;
use crate::client::{DeliveryClient, HttpDeliveryClient};
use crate::constants;
use crate::errors;
use crate::flusher::{ExhaustionPolicy, Flusher, FlusherConfig};
use crate::retry::RetryStrategy;
use crate::scheduler::{FlushScheduler, FlushTrigger, SizeSignal};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub batch_size: usize,
    pub batch_interval: Duration,
    pub destination: String,
    pub max_pending: usize,
    pub retry_strategy: RetryStrategy,
    /// Bound on a single delivery attempt
    pub attempt_timeout: Duration,
    pub https_proxy: Option<String>,
    pub on_exhausted: ExhaustionPolicy,
    /// Restart the flush interval after a size-triggered flush
    pub reset_interval_on_flush: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: constants::DEFAULT_BATCH_SIZE,
            batch_interval: constants::DEFAULT_BATCH_INTERVAL,
            destination: constants::DEFAULT_DESTINATION.to_string(),
            max_pending: constants::DEFAULT_MAX_PENDING,
            retry_strategy: RetryStrategy::default(),
            attempt_timeout: constants::DEFAULT_ATTEMPT_TIMEOUT,
            https_proxy: None,
            on_exhausted: ExhaustionPolicy::default(),
            reset_interval_on_flush: false,
        }
    }
}

/// Owns the flush loop. Run [`BatchingEngine::start`] on its own task and feed records through
/// the [`EngineHandle`].
pub struct BatchingEngine<R> {
    buffer: Arc<BatchBuffer<R>>,
    flusher: Flusher,
    size_signal: SizeSignal,
    shutdown: CancellationToken,
    batch_interval: Duration,
    reset_interval_on_flush: bool,
}

impl<R> BatchingEngine<R>
where
    R: Serialize + Send + 'static,
{
    pub fn new(
        config: EngineConfig,
        client: Arc<dyn DeliveryClient>,
    ) -> Result<(Self, EngineHandle<R>), errors::Creation> {
        if config.batch_interval.is_zero() {
            return Err(errors::Creation::ZeroBatchInterval);
        }
        if config.retry_strategy.max_attempts() == 0 {
            return Err(errors::Creation::NoAttempts);
        }
        let buffer = Arc::new(BatchBuffer::new(config.batch_size, config.max_pending)?);
        let size_signal = SizeSignal::new();
        let shutdown = CancellationToken::new();

        let flusher = Flusher::new(FlusherConfig {
            client,
            retry_strategy: config.retry_strategy,
            on_exhausted: config.on_exhausted,
        });

        let handle = EngineHandle {
            buffer: Arc::clone(&buffer),
            size_signal: size_signal.clone(),
            shutdown: shutdown.clone(),
            stopped: Arc::new(AtomicBool::new(false)),
        };

        Ok((
            Self {
                buffer,
                flusher,
                size_signal,
                shutdown,
                batch_interval: config.batch_interval,
                reset_interval_on_flush: config.reset_interval_on_flush,
            },
            handle,
        ))
    }

    /// Same as [`BatchingEngine::new`] with an [`HttpDeliveryClient`] posting to
    /// `config.destination`.
    pub fn with_http_client(
        config: EngineConfig,
    ) -> Result<(Self, EngineHandle<R>), errors::Creation> {
        let client = HttpDeliveryClient::new(
            &config.destination,
            config.attempt_timeout,
            config.https_proxy.as_deref(),
        )?;
        Self::new(config, Arc::new(client))
    }

    /// Runs until [`EngineHandle::stop`] is called, after delivering whatever is still pending.
    ///
    /// Returns early with [`errors::Engine::DeliveryExhausted`] when a batch could not be
    /// delivered and the engine was built with [`ExhaustionPolicy::Exit`].
    pub async fn start(self) -> Result<(), errors::Engine> {
        let mut scheduler = FlushScheduler::new(
            self.batch_interval,
            self.size_signal.clone(),
            self.shutdown.clone(),
            self.reset_interval_on_flush,
        );
        debug!(
            capacity = self.buffer.capacity(),
            interval = ?self.batch_interval,
            "Batching engine started"
        );

        while let Some(trigger) = scheduler.next_trigger().await {
            let batch = match trigger {
                FlushTrigger::ShutdownRequested => self.buffer.close(),
                FlushTrigger::SizeReached | FlushTrigger::IntervalElapsed => {
                    self.buffer.drain_all()
                }
            };
            if batch.is_empty() {
                continue;
            }

            debug!(?trigger, size = batch.len(), "Flushing batch");
            if let Err(e) = self.flusher.flush(batch).await {
                let discarded = self.buffer.close();
                if !discarded.is_empty() {
                    error!(
                        discarded = discarded.len(),
                        "Batching engine stopping, discarding pending records"
                    );
                }
                return Err(e);
            }
            scheduler.flushed(trigger);
        }

        debug!("Batching engine stopped");
        Ok(())
    }
}

/// Producer side of the engine. Cheap to clone, safe to use from any task.
pub struct EngineHandle<R> {
    buffer: Arc<BatchBuffer<R>>,
    size_signal: SizeSignal,
    shutdown: CancellationToken,
    stopped: Arc<AtomicBool>,
}

impl<R> Clone for EngineHandle<R> {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            size_signal: self.size_signal.clone(),
            shutdown: self.shutdown.clone(),
            stopped: Arc::clone(&self.stopped),
        }
    }
}

impl<R> EngineHandle<R> {
    /// Queues a record for the next batch. A rejected record is dropped and logged; callers
    /// are free to ignore the error.
    pub fn add(&self, record: R) -> Result<(), errors::Insert> {
        match self.buffer.add(record) {
            Ok(len) => {
                if len == self.buffer.capacity() {
                    self.size_signal.raise();
                }
                Ok(())
            }
            Err(e @ errors::Insert::Saturated { max_pending }) => {
                error!(max_pending, "Buffer saturated, dropping entry");
                Err(e)
            }
            Err(e @ errors::Insert::Stopped) => {
                warn!("Batching engine stopped, dropping entry");
                Err(e)
            }
        }
    }

    /// Requests shutdown. The engine delivers pending records once more and `start` returns.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            warn!("Batching engine already stopped, ignoring stop request");
            return;
        }
        debug!("Stopping batching engine");
        self.shutdown.cancel();
    }

    /// Pending records, advisory.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
