// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![allow(clippy::unwrap_used)]

use crate::client::{AttemptOutcome, DeliveryClient};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// In-memory destination. Replays scripted outcomes, then succeeds with 200.
#[derive(Default)]
pub(crate) struct FakeClient {
    script: Mutex<VecDeque<AttemptOutcome>>,
    latency: Duration,
    sends: Mutex<Vec<(Instant, Vec<u8>)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn scripted(outcomes: impl IntoIterator<Item = AttemptOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self::scripted(vec![AttemptOutcome::Rejected(StatusCode::INTERNAL_SERVER_ERROR); 64])
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn send_count(&self) -> usize {
        self.sends.lock().unwrap().len()
    }

    pub(crate) fn send_times(&self) -> Vec<Instant> {
        self.sends.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    /// Every payload received, decoded as JSON.
    pub(crate) fn payloads(&self) -> Vec<serde_json::Value> {
        self.sends
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| serde_json::from_slice(body).unwrap())
            .collect()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryClient for FakeClient {
    async fn send(&self, payload: &[u8]) -> AttemptOutcome {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        self.sends
            .lock()
            .unwrap()
            .push((Instant::now(), payload.to_vec()));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(AttemptOutcome::Delivered(StatusCode::OK))
    }
}
