// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Webhook receiver: accepts log entries over HTTP, validates them and hands them to a
//! [`log_batcher`] engine that forwards them in batches.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod config;
pub mod errors;
pub mod handler;
pub mod http_utils;
pub mod logger;
pub mod model;
pub mod server;
pub mod validation;

use crate::config::Config;
use crate::errors::ReceiverError;
use crate::model::LogEntry;
use log_batcher::engine::BatchingEngine;
use log_batcher::errors as batcher;
use std::future::Future;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Binds `config.listen_addr` and serves until `shutdown_signal` resolves.
pub async fn run<F>(config: Config, shutdown_signal: F) -> Result<(), ReceiverError>
where
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| ReceiverError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    run_with_listener(config, listener, shutdown_signal).await
}

/// Serves on an already bound listener.
///
/// Returns when `shutdown_signal` resolves and pending entries have been flushed, or early with
/// [`ReceiverError::Delivery`] when the engine gave up on a batch. Open connections and the final
/// flush are each bounded by `config.shutdown_grace_period`, one after the other.
pub async fn run_with_listener<F>(
    config: Config,
    listener: TcpListener,
    shutdown_signal: F,
) -> Result<(), ReceiverError>
where
    F: Future<Output = ()>,
{
    let (engine, handle) = BatchingEngine::<LogEntry>::with_http_client(config.engine_config())?;
    let mut engine_task = tokio::spawn(engine.start());

    let server_shutdown = CancellationToken::new();
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, destination = %config.post_endpoint, "Server starting");
    }
    let mut server_task = tokio::spawn(server::serve(
        listener,
        handle.clone(),
        server_shutdown.clone(),
        config.shutdown_grace_period,
    ));

    let mut engine_result = None;
    let mut server_result = None;
    tokio::pin!(shutdown_signal);
    tokio::select! {
        () = &mut shutdown_signal => info!("Shutting down server"),
        result = &mut engine_task => engine_result = Some(engine_outcome(result)),
        result = &mut server_task => server_result = Some(server_outcome(result)),
    }

    server_shutdown.cancel();
    let server_result = match server_result {
        Some(result) => result,
        None => server_outcome(server_task.await),
    };

    // the final flush gets its own grace period, whatever the server drain used up
    let engine_result = match engine_result {
        Some(result) => result,
        None => {
            handle.stop();
            match tokio::time::timeout(config.shutdown_grace_period, &mut engine_task).await {
                Ok(result) => engine_outcome(result),
                Err(_) => {
                    warn!(
                        pending = handle.len(),
                        "Grace period elapsed before pending entries were delivered"
                    );
                    engine_task.abort();
                    Ok(())
                }
            }
        }
    };

    if let Err(e) = &server_result {
        error!("{e}");
    }
    engine_result?;
    server_result?;
    info!("Server exited properly");
    Ok(())
}

fn engine_outcome(
    result: Result<Result<(), batcher::Engine>, JoinError>,
) -> Result<(), ReceiverError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(ReceiverError::EngineTask(e.to_string())),
    }
}

fn server_outcome(
    result: Result<Result<(), ReceiverError>, JoinError>,
) -> Result<(), ReceiverError> {
    match result {
        Ok(result) => result,
        Err(e) => Err(ReceiverError::Server(std::io::Error::other(e.to_string()))),
    }
}
