// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors;
use std::sync::Mutex;

#[derive(Debug)]
struct Pending<R> {
    records: Vec<R>,
    closed: bool,
}

/// Pending records shared between producers and the engine.
///
/// Every access goes through a single mutex. The lock is only held for a push or a swap and is
/// never held across an `.await`.
#[derive(Debug)]
pub struct BatchBuffer<R> {
    pending: Mutex<Pending<R>>,
    capacity: usize,
    max_pending: usize,
}

impl<R> BatchBuffer<R> {
    /// `capacity` is the flush threshold, `max_pending` the point past which records are dropped.
    pub fn new(capacity: usize, max_pending: usize) -> Result<Self, errors::Creation> {
        if capacity == 0 {
            return Err(errors::Creation::ZeroBatchSize);
        }
        if max_pending < capacity {
            return Err(errors::Creation::MaxPendingBelowBatchSize {
                max_pending,
                batch_size: capacity,
            });
        }
        Ok(Self {
            pending: Mutex::new(Pending {
                records: Vec::with_capacity(capacity),
                closed: false,
            }),
            capacity,
            max_pending,
        })
    }

    /// Appends a record and returns the pending length observed under the lock.
    pub fn add(&self, record: R) -> Result<usize, errors::Insert> {
        #[allow(clippy::expect_used)]
        let mut pending = self.pending.lock().expect("lock poisoned");
        if pending.closed {
            return Err(errors::Insert::Stopped);
        }
        if pending.records.len() >= self.max_pending {
            return Err(errors::Insert::Saturated {
                max_pending: self.max_pending,
            });
        }
        pending.records.push(record);
        Ok(pending.records.len())
    }

    /// Takes every pending record, in arrival order, and leaves the buffer empty.
    pub fn drain_all(&self) -> Vec<R> {
        #[allow(clippy::expect_used)]
        let mut pending = self.pending.lock().expect("lock poisoned");
        std::mem::replace(&mut pending.records, Vec::with_capacity(self.capacity))
    }

    /// Drains the buffer for the last time. Every later `add` fails with
    /// [`errors::Insert::Stopped`].
    pub fn close(&self) -> Vec<R> {
        #[allow(clippy::expect_used)]
        let mut pending = self.pending.lock().expect("lock poisoned");
        pending.closed = true;
        std::mem::take(&mut pending.records)
    }

    /// Advisory: may be stale as soon as it returns.
    pub fn len(&self) -> usize {
        #[allow(clippy::expect_used)]
        self.pending.lock().expect("lock poisoned").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
