use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use super::{
    error::ApiError,
    models::{
        ExtractFilesRequest, FileListResponse, HealthResponse, LogsQuery, LogsResponse,
        MetadataRequest, OkResponse, ProxyQuery,
    },
    state::AppState,
    utils::read_json,
    validation,
};
use crate::extractor::ExtractionResult;
use crate::normalize::{FileListing, normalize};
use crate::proxy::ProxyDownload;

/// Lets clients find the correlation id of a proxied download.
pub const PROXY_ID_HEADER: HeaderName = HeaderName::from_static("x-proxy-id");

/// Share-page metadata (POST /api/metadata)
///
/// Body `{ "url": "<share page>" }`. Answers with the first extraction
/// strategy that matched, or the raw-HTML fallback with `success: false`.
/// Only an unreachable share page is an error (500).
pub async fn metadata(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, ApiError> {
    let max_size = state.config.server.max_body_bytes.as_usize();
    let request: MetadataRequest = read_json(&headers, body, max_size).await?;
    let share_url = validation::validate_metadata_request(request)?;

    state.metrics.metadata_requested();
    info!(url = %share_url, "Extracting share metadata");

    let result = state.extractor.extract(&share_url).await.inspect_err(|_| {
        state.metrics.extraction_failed();
    })?;
    state.metrics.extracted(result.source());

    Ok(Json(result))
}

/// File list normalization (POST /api/extract-files)
///
/// Body `{ "metadata": <ExtractionResult>, "shareUrl": "..." }`. Metadata
/// that is not an extraction result is echoed back with `ok: false`.
pub async fn extract_files(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, ApiError> {
    let max_size = state.config.server.max_body_bytes.as_usize();
    let request: ExtractFilesRequest = read_json(&headers, body, max_size).await?;
    let (metadata, share_url) = validation::validate_extract_files_request(request)?;

    let listing = match serde_json::from_value::<ExtractionResult>(metadata.clone()) {
        Ok(result) => normalize(&result, &share_url),
        Err(e) => {
            debug!(error = %e, "Metadata is not an extraction result");
            FileListing::Unresolved {
                message: format!("metadata is not a recognised extraction result: {e}"),
                metadata,
            }
        }
    };

    Ok(Json(FileListResponse::from(listing)))
}

/// Streaming download proxy (GET /api/proxy?url=&id=)
///
/// Errors before the upstream headers arrive become JSON bodies (400, 502,
/// 500). Once streaming has started, failures only cut the body short.
pub async fn proxy(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, ApiError> {
    let download = state
        .proxy
        .open(query.url.as_deref(), query.id.as_deref())
        .await?;

    Ok(stream_response(download))
}

fn stream_response(download: ProxyDownload) -> Response {
    let mut headers = HeaderMap::new();

    let content_type = HeaderValue::from_str(&download.content_type)
        .unwrap_or(HeaderValue::from_static(crate::proxy::DEFAULT_CONTENT_TYPE));
    headers.insert(header::CONTENT_TYPE, content_type);

    if let Some(value) = download
        .content_disposition
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(length) = download.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }
    if let Ok(id) = HeaderValue::from_str(&download.id) {
        headers.insert(PROXY_ID_HEADER, id);
    }

    (StatusCode::OK, headers, Body::from_stream(download.body)).into_response()
}

/// Proxy event log (GET /api/logs?id=)
pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id = validation::validate_logs_id(query.id)?;
    let logs = state.logs.get(&id);

    Ok(Json(LogsResponse { id, logs }))
}

/// Wipes every proxy log (POST /api/clear-logs)
pub async fn clear_logs(State(state): State<AppState>) -> impl IntoResponse {
    state.logs.clear_all();
    Json(OkResponse { ok: true })
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        metrics: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(response))
}
