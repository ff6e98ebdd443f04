// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::config::MAX_CONTENT_LENGTH;
use crate::http_utils::{
    json_response, log_and_create_http_response, text_response, verify_request_content_length,
    HttpResponse,
};
use crate::model::LogEntry;
use crate::validation;
use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use hyper::{http, Method, Request, StatusCode};
use log_batcher::engine::EngineHandle;
use serde_json::json;
use tracing::{debug, error, warn};

pub const HEALTH_ENDPOINT_PATH: &str = "/healthz";
pub const LOG_ENDPOINT_PATH: &str = "/log";

/// Routes a request to the health check or the log intake.
pub async fn handle_request<B>(
    req: Request<B>,
    engine: EngineHandle<LogEntry>,
) -> http::Result<HttpResponse>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match (req.method(), req.uri().path()) {
        (&Method::GET, HEALTH_ENDPOINT_PATH) => text_response("OK", StatusCode::OK),
        (&Method::POST, LOG_ENDPOINT_PATH) => log_payload(req, &engine).await,
        (method, path @ (HEALTH_ENDPOINT_PATH | LOG_ENDPOINT_PATH)) => {
            debug!("Method {method} not allowed on {path}");
            json_response(
                &json!({ "message": format!("Method {method} not allowed on {path}") }),
                StatusCode::METHOD_NOT_ALLOWED,
            )
        }
        (method, path) => {
            debug!("No route for {method} {path}");
            json_response(
                &json!({ "message": format!("Endpoint {method} {path} not found") }),
                StatusCode::NOT_FOUND,
            )
        }
    }
}

/// Decodes and validates one log entry, then queues it for the next batch. The caller gets a
/// 202 once the entry is handed over, whatever happens to it afterwards.
async fn log_payload<B>(
    req: Request<B>,
    engine: &EngineHandle<LogEntry>,
) -> http::Result<HttpResponse>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(response) = verify_request_content_length(
        req.headers(),
        MAX_CONTENT_LENGTH,
        "Error processing log entry",
    ) {
        return response;
    }

    let body = match Limited::new(req.into_body(), MAX_CONTENT_LENGTH)
        .collect()
        .await
    {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return log_and_create_http_response(
                &format!("Error processing log entry: Unable to read request body: {e}"),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let entry: LogEntry = match serde_json::from_slice(&body) {
        Ok(entry) => entry,
        Err(e) => {
            error!("Failed to decode json: {e}");
            return json_response(
                &json!({ "error": "invalid request payload" }),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    if let Err(field_errors) = validation::validate(&entry) {
        warn!(errors = field_errors.len(), "Validation failed");
        return json_response(&field_errors, StatusCode::BAD_REQUEST);
    }

    // a rejected entry is already logged by the engine
    if let Err(e) = engine.add(entry) {
        debug!("Log entry not queued: {e}");
    }
    json_response(&json!({ "status": "Ok" }), StatusCode::ACCEPTED)
}
