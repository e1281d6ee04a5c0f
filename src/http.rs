//! Shared HTTP client construction and response classification

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::{ErrorCode, TripBriefError};

/// Longest provider error body kept in error context
const MAX_ERROR_BODY: usize = 300;

/// Build the one client every provider shares
pub fn build_client(config: &HttpConfig) -> crate::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| TripBriefError::config(format!("Failed to create HTTP client: {e}")))
}

/// Map a transport failure into an API error.
///
/// The request URL is dropped from the error: query strings carry API keys.
pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> TripBriefError {
    let kind = if error.is_timeout() { "timed out" } else { "failed" };
    let error = error.without_url();
    warn!("{provider} request {kind}: {error}");
    TripBriefError::api_with_context(
        format!("{provider} request {kind}"),
        ErrorCode::ApiNetworkError,
        HashMap::from([("error".to_string(), error.to_string())]),
    )
}

/// Map a body that did not deserialize into an API error
pub(crate) fn invalid_response(provider: &str, error: reqwest::Error) -> TripBriefError {
    let error = error.without_url();
    warn!("Failed to parse {provider} response: {error}");
    TripBriefError::api_with_context(
        format!("Invalid data received from {provider}"),
        ErrorCode::ApiInvalidResponse,
        HashMap::from([("error".to_string(), error.to_string())]),
    )
}

/// Pass successful responses through; classify everything else
pub(crate) async fn check_status(provider: &str, response: Response) -> crate::Result<Response> {
    let status = response.status();
    debug!("{provider} responded with {status}");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(provider, status, &body))
}

pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> TripBriefError {
    let mut context = HashMap::from([("status_code".to_string(), status.as_u16().to_string())]);
    if !body.is_empty() {
        context.insert("body".to_string(), truncate(body, MAX_ERROR_BODY));
    }

    let (message, code) = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => (
            format!("{provider} rejected the API key"),
            ErrorCode::ApiUnauthorized,
        ),
        StatusCode::TOO_MANY_REQUESTS => (
            format!("{provider} rate limit exceeded"),
            ErrorCode::ApiRateLimit,
        ),
        _ => (
            format!(
                "{provider} request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            ),
            ErrorCode::ApiNetworkError,
        ),
    };

    warn!("{message}");
    TripBriefError::api_with_context(message, code, context)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
