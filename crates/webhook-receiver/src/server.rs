// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::ReceiverError;
use crate::handler;
use crate::model::LogEntry;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use log_batcher::engine::EngineHandle;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Accepts HTTP/1 connections until `shutdown` fires, then lets open connections finish for at
/// most `grace_period`.
pub async fn serve(
    listener: TcpListener,
    engine: EngineHandle<LogEntry>,
    shutdown: CancellationToken,
    grace_period: Duration,
) -> Result<(), ReceiverError> {
    let mut server = hyper::server::conn::http1::Builder::new();
    server
        .timer(TokioTimer::new())
        .header_read_timeout(HEADER_READ_TIMEOUT);
    let mut joinset = JoinSet::new();

    loop {
        let conn = tokio::select! {
            () = shutdown.cancelled() => break,
            con_res = listener.accept() => match con_res {
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::ConnectionAborted
                            | io::ErrorKind::ConnectionReset
                            | io::ErrorKind::ConnectionRefused
                    ) =>
                {
                    continue;
                }
                Err(e) => {
                    error!("Server error: {e}");
                    return Err(e.into());
                }
                Ok((conn, _)) => conn,
            },
            finished = async {
                match joinset.join_next().await {
                    Some(finished) => finished,
                    None => std::future::pending().await,
                }
            } => match finished {
                Err(e) if e.is_panic() => {
                    error!("Connection handler panicked: {:?}", e);
                    continue;
                },
                Ok(()) | Err(_) => continue,
            },
        };

        let conn = TokioIo::new(conn);
        let server = server.clone();
        let engine = engine.clone();
        let shutdown = shutdown.clone();
        joinset.spawn(async move {
            let service = service_fn(move |req| handler::handle_request(req, engine.clone()));
            let conn = server.serve_connection(conn, service);
            tokio::pin!(conn);
            let result = tokio::select! {
                result = conn.as_mut() => result,
                () = shutdown.cancelled() => {
                    conn.as_mut().graceful_shutdown();
                    conn.await
                }
            };
            if let Err(e) = result {
                debug!("Connection error: {e}");
            }
        });
    }

    drop(listener);
    debug!(connections = joinset.len(), "Server stopped accepting connections");

    let drained = tokio::time::timeout(grace_period, async {
        while joinset.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!(
            connections = joinset.len(),
            "Grace period elapsed, closing remaining connections"
        );
        joinset.abort_all();
    }
    Ok(())
}
