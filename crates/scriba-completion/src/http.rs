//! HTTP error mapping shared by the REST backends.

use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use scriba_core::CompletionError;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps a non-success provider response to a [`CompletionError`],
/// extracting the provider's error message when the body carries the usual
/// `{"error": {"message": ...}}` wrapper.
pub(crate) fn map_http_error(
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> CompletionError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    CompletionError::Process {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
        retry_after,
    }
}

/// Maps a transport-level failure (connect, timeout) before any status was
/// received.
pub(crate) fn map_transport_error(provider: &str, err: reqwest::Error) -> CompletionError {
    CompletionError::Process {
        status_code: None,
        message: format!("{provider} API request failed: {err}"),
        is_retryable: err.is_connect() || err.is_timeout(),
        retry_after: None,
    }
}

/// Parses a `Retry-After` header value. Integer seconds only; the
/// HTTP-date form is omitted.
pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    let seconds = value.parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds))
}
