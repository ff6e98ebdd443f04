// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Flush triggers.
//!
//! The scheduler waits on three conditions and reports which one fired first: the shutdown
//! token, the size signal raised by producers, and the flush interval. A single task consumes
//! the triggers, so two flushes never run concurrently.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Reason for a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    SizeReached,
    IntervalElapsed,
    ShutdownRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    /// Terminal, entered on shutdown
    Stopped,
}

/// Raised by producers when the buffer reaches its flush threshold.
///
/// A signal raised while nobody waits is kept until the scheduler polls again, and signals
/// raised in between coalesce into one.
#[derive(Debug, Clone, Default)]
pub struct SizeSignal(Arc<Notify>);

impl SizeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.notify_one();
    }

    async fn raised(&self) {
        self.0.notified().await;
    }
}

pub struct FlushScheduler {
    interval: Interval,
    size_signal: SizeSignal,
    shutdown: CancellationToken,
    reset_on_flush: bool,
    state: SchedulerState,
}

impl FlushScheduler {
    /// The first interval tick happens one full `period` after creation. Must be called from
    /// within a tokio runtime.
    pub fn new(
        period: Duration,
        size_signal: SizeSignal,
        shutdown: CancellationToken,
        reset_on_flush: bool,
    ) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        // ticks missed during a slow delivery are dropped, not replayed
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            size_signal,
            shutdown,
            reset_on_flush,
            state: SchedulerState::Running,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Waits for the next trigger. Returns `None` once shutdown has been reported.
    pub async fn next_trigger(&mut self) -> Option<FlushTrigger> {
        if self.state == SchedulerState::Stopped {
            return None;
        }

        let trigger = tokio::select! {
            biased;
            () = self.shutdown.cancelled() => FlushTrigger::ShutdownRequested,
            () = self.size_signal.raised() => FlushTrigger::SizeReached,
            _ = self.interval.tick() => FlushTrigger::IntervalElapsed,
        };

        if trigger == FlushTrigger::ShutdownRequested {
            self.state = SchedulerState::Stopped;
        }
        Some(trigger)
    }

    /// Called after a non-empty flush has completed.
    pub fn flushed(&mut self, trigger: FlushTrigger) {
        if self.reset_on_flush && trigger == FlushTrigger::SizeReached {
            self.interval.reset();
        }
    }
}
