// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Request routing and handlers for the loghub HTTP surface.
//!
//! Endpoints:
//! - `POST /log`: ingest one event
//! - `POST /log/batch`: ingest a batch with per-event isolation
//! - `GET /logs/{service}`: filtered, paginated retrieval
//! - `GET /health`: liveness probe
//!
//! Error mapping is uniform: malformed payloads and invalid arguments
//! become 400, storage failures become 500, and everything unrouted is a
//! bare 404.

use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDateTime;
use http_body_util::{BodyExt, Full};
use hyper::{http, Method, Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use loghub_core::{DestinationRegistry, IngestionEngine, LogEvent, RetrievalEngine, RetrieveQuery};

const LOG_ENDPOINT_PATH: &str = "/log";
const BATCH_ENDPOINT_PATH: &str = "/log/batch";
const LOGS_ENDPOINT_PREFIX: &str = "/logs/";
const HEALTH_ENDPOINT_PATH: &str = "/health";

/// Timestamp format accepted in query parameters and health responses.
const QUERY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

type HttpResponse = Response<Full<Bytes>>;

/// Body of `POST /log/batch`.
#[derive(Debug, Deserialize)]
struct LogBatchRequest {
    logs: Vec<LogEvent>,
}

/// Does two things:
/// 1. Logs the given message. A success status code (within 200-299) will
///    cause a debug log to be written, otherwise error will be written.
/// 2. Returns the given message in the body of a JSON response with the
///    given status code, as `{"message": message}`.
fn log_and_create_http_response(message: &str, status: StatusCode) -> http::Result<HttpResponse> {
    if status.is_success() {
        debug!("{message}");
    } else {
        error!("{message}");
    }
    let body = json!({ "message": message }).to_string();
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(body)))
}

fn json_response(status: StatusCode, body: serde_json::Value) -> http::Result<HttpResponse> {
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
}

/// The HTTP-facing half of the service: owns the two engines and maps
/// requests onto them.
#[derive(Debug)]
pub struct LogService {
    ingestion: IngestionEngine,
    retrieval: RetrievalEngine,
}

impl LogService {
    #[must_use]
    pub fn new(registry: Arc<DestinationRegistry>) -> Self {
        LogService {
            ingestion: IngestionEngine::new(Arc::clone(&registry)),
            retrieval: RetrievalEngine::new(registry),
        }
    }

    /// Routes one request. Generic over the request body so handlers can
    /// be driven directly in tests with in-memory bodies.
    pub async fn handle<B>(&self, req: Request<B>) -> http::Result<HttpResponse>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        match (req.method(), req.uri().path()) {
            (&Method::POST, LOG_ENDPOINT_PATH) => self.log_handler(req).await,
            (&Method::POST, BATCH_ENDPOINT_PATH) => self.batch_handler(req).await,
            (&Method::GET, HEALTH_ENDPOINT_PATH) => Self::health_handler(),
            (&Method::GET, path) if path.starts_with(LOGS_ENDPOINT_PREFIX) => {
                // The segment arrives percent-encoded; decode it so the
                // lookup key matches what ingestion wrote.
                let service = match percent_decode(&path[LOGS_ENDPOINT_PREFIX.len()..]) {
                    Ok(service) => service,
                    Err(message) => {
                        return log_and_create_http_response(
                            &format!("Invalid service name in path: {message}"),
                            StatusCode::BAD_REQUEST,
                        );
                    }
                };
                let query = req.uri().query().map(str::to_owned);
                self.logs_handler(&service, query.as_deref()).await
            }
            _ => Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Full::new(Bytes::new())),
        }
    }

    async fn log_handler<B>(&self, req: Request<B>) -> http::Result<HttpResponse>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        let event: LogEvent = match read_json_body(req).await {
            Ok(event) => event,
            Err(response) => return response,
        };

        match self.ingestion.ingest(&event).await {
            Ok(written) => {
                debug!(
                    "Ingested event for service '{}' (written: {written})",
                    event.service
                );
                json_response(
                    StatusCode::OK,
                    json!({ "status": "success", "written": written }),
                )
            }
            Err(e) if e.is_invalid_argument() => log_and_create_http_response(
                &format!("Invalid log request: {e}"),
                StatusCode::BAD_REQUEST,
            ),
            Err(e) => log_and_create_http_response(
                &format!("Error writing log: {e}"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        }
    }

    async fn batch_handler<B>(&self, req: Request<B>) -> http::Result<HttpResponse>
    where
        B: hyper::body::Body,
        B::Error: std::fmt::Display,
    {
        let batch: LogBatchRequest = match read_json_body(req).await {
            Ok(batch) => batch,
            Err(response) => return response,
        };

        let receipt = self.ingestion.ingest_batch(&batch.logs).await;
        debug!(
            "Batch processed: {} attempted, {} written, {} skipped, {} failed",
            receipt.attempted,
            receipt.written,
            receipt.skipped,
            receipt.failed()
        );

        // `count` echoes the submitted batch size; the breakdown fields
        // carry the per-event outcomes. A partially-failed batch is still
        // a 200 because each event stands alone.
        json_response(
            StatusCode::OK,
            json!({
                "status": "success",
                "count": receipt.attempted,
                "written": receipt.written,
                "failed": receipt.failed(),
            }),
        )
    }

    async fn logs_handler(
        &self,
        service: &str,
        raw_query: Option<&str>,
    ) -> http::Result<HttpResponse> {
        let query = match parse_retrieve_query(raw_query) {
            Ok(query) => query,
            Err(message) => {
                return log_and_create_http_response(
                    &format!("Invalid logs query: {message}"),
                    StatusCode::BAD_REQUEST,
                );
            }
        };

        match self.retrieval.retrieve(service, &query).await {
            Ok(page) => json_response(
                StatusCode::OK,
                json!({ "logs": page.lines, "total": page.total }),
            ),
            Err(e) if e.is_invalid_argument() => log_and_create_http_response(
                &format!("Invalid logs request: {e}"),
                StatusCode::BAD_REQUEST,
            ),
            Err(e) => log_and_create_http_response(
                &format!("Error retrieving logs: {e}"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        }
    }

    fn health_handler() -> http::Result<HttpResponse> {
        let now = chrono::Local::now()
            .naive_local()
            .format(QUERY_TIMESTAMP_FORMAT)
            .to_string();
        json_response(
            StatusCode::OK,
            json!({ "status": "healthy", "timestamp": now }),
        )
    }
}

/// Collects and deserializes a JSON request body, turning read and parse
/// failures into ready-made 400 responses.
async fn read_json_body<B, T>(req: Request<B>) -> Result<T, http::Result<HttpResponse>>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
    T: serde::de::DeserializeOwned,
{
    let body_bytes = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return Err(log_and_create_http_response(
                &format!("Error reading request body: {e}"),
                StatusCode::BAD_REQUEST,
            ));
        }
    };
    serde_json::from_slice(&body_bytes).map_err(|e| {
        log_and_create_http_response(
            &format!("Invalid request payload: {e}"),
            StatusCode::BAD_REQUEST,
        )
    })
}

/// Parses the query string of `GET /logs/{service}` into a
/// [`RetrieveQuery`]. Unknown parameters are ignored; recognized
/// parameters with unusable values are an error.
fn parse_retrieve_query(raw: Option<&str>) -> Result<RetrieveQuery, String> {
    let mut query = RetrieveQuery::default();
    let Some(raw) = raw else {
        return Ok(query);
    };

    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        let (key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = percent_decode(raw_value)?;
        match key {
            "level" => query.level = Some(value),
            "start_time" => query.start_time = Some(parse_query_timestamp(key, &value)?),
            "end_time" => query.end_time = Some(parse_query_timestamp(key, &value)?),
            "limit" => {
                query.limit = value
                    .parse()
                    .map_err(|_| format!("limit must be a positive integer, got '{value}'"))?;
            }
            "offset" => {
                query.offset = value
                    .parse()
                    .map_err(|_| format!("offset must be a non-negative integer, got '{value}'"))?;
            }
            _ => {}
        }
    }
    Ok(query)
}

fn parse_query_timestamp(key: &str, value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, QUERY_TIMESTAMP_FORMAT)
        .map_err(|_| format!("{key} must be formatted as {QUERY_TIMESTAMP_FORMAT}, got '{value}'"))
}

/// Minimal percent-decoding for query parameter values: `%XX` escapes and
/// `+` as space. Stray or truncated escapes are an error.
fn percent_decode(value: &str) -> Result<String, String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|pair| std::str::from_utf8(pair).ok())
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or_else(|| format!("invalid percent-escape in '{value}'"))?;
                out.push(hex);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| format!("invalid UTF-8 after decoding '{value}'"))
}
