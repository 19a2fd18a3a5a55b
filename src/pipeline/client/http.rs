//! Shared HTTP plumbing for the reqwest-based clients.

use crate::error::VegaError;
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A client with library defaults: no request timeout, no retries.
pub(crate) fn client() -> Result<reqwest::Client, VegaError> {
    reqwest::Client::builder()
        .user_agent(concat!("vega-xtp/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| VegaError::ProviderNotConfigured {
            provider: "http".to_string(),
            hint: e.to_string(),
        })
}

/// Decode a JSON success body, or map the failure status to a [`VegaError`].
pub(crate) async fn decode_json<T: DeserializeOwned>(
    provider: &str,
    response: Response,
) -> Result<T, VegaError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| VegaError::LlmApiError {
                message: format!("{provider}: could not decode response: {e}"),
            });
    }

    let retry_after_secs = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    let body = response.text().await.unwrap_or_default();
    Err(status_error(provider, status, &body, retry_after_secs))
}

/// Consume a response whose body we don't need, failing on non-2xx.
pub(crate) async fn expect_success(provider: &str, response: Response) -> Result<(), VegaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(provider, status, &body, None))
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Both Anthropic and OpenAI wrap failures as `{"error": {"message": …}}`.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
}

pub(crate) fn status_error(
    provider: &str,
    status: StatusCode,
    body: &str,
    retry_after_secs: Option<u64>,
) -> VegaError {
    let detail = error_message(body).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status.to_string()
        } else {
            trimmed.to_string()
        }
    });

    match status {
        StatusCode::TOO_MANY_REQUESTS => VegaError::RateLimitExceeded {
            provider: provider.to_string(),
            retry_after_secs,
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VegaError::AuthError {
            provider: provider.to_string(),
            detail,
        },
        _ => VegaError::LlmApiError {
            message: format!("{provider} returned HTTP {}: {detail}", status.as_u16()),
        },
    }
}
