// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Single-attempt delivery of a serialized batch.
//!
//! A [`DeliveryClient`] performs exactly one network call per [`DeliveryClient::send`] and only
//! classifies the result. Retrying is the caller's business, see [`crate::flusher::Flusher`].

use crate::constants::CONTENT_TYPE_JSON;
use crate::errors;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use std::fmt;
use std::time::Duration;

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The destination answered with a 2xx status.
    Delivered(StatusCode),
    /// The destination answered with any other status.
    Rejected(StatusCode),
    /// No usable response: connection failure, timeout, broken body.
    Transport(String),
}

impl AttemptOutcome {
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            AttemptOutcome::Delivered(status)
        } else {
            AttemptOutcome::Rejected(status)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Delivered(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AttemptOutcome::Delivered(status) | AttemptOutcome::Rejected(status) => Some(*status),
            AttemptOutcome::Transport(_) => None,
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Delivered(status) => write!(f, "delivered ({status})"),
            AttemptOutcome::Rejected(status) => write!(f, "unexpected status {status}"),
            AttemptOutcome::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Sends `payload` once and classifies the outcome.
    async fn send(&self, payload: &[u8]) -> AttemptOutcome;
}

/// Posts JSON payloads to a fixed destination over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDeliveryClient {
    client: reqwest::Client,
    destination: Url,
}

impl HttpDeliveryClient {
    /// `timeout` bounds every single attempt, independently of any retry budget.
    pub fn new(
        destination: &str,
        timeout: Duration,
        https_proxy: Option<&str>,
    ) -> Result<Self, errors::Creation> {
        let destination = Url::parse(destination)
            .map_err(|e| errors::Creation::Destination(destination.to_string(), e.to_string()))?;
        let client = build_client(https_proxy, timeout)
            .map_err(|e| errors::Creation::Client(e.to_string()))?;
        Ok(Self {
            client,
            destination,
        })
    }
}

#[async_trait]
impl DeliveryClient for HttpDeliveryClient {
    async fn send(&self, payload: &[u8]) -> AttemptOutcome {
        let resp = self
            .client
            .post(self.destination.clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(payload.to_vec())
            .send()
            .await;

        match resp {
            Ok(resp) => AttemptOutcome::from_status(resp.status()),
            Err(e) => AttemptOutcome::Transport(e.to_string()),
        }
    }
}

/// Builds a reqwest client with optional proxy configuration and timeout.
fn build_client(
    proxy_url: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(proxy) = proxy_url {
        builder = builder.proxy(reqwest::Proxy::https(proxy)?);
    }
    builder.build()
}
