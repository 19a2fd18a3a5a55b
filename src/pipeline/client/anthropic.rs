//! Anthropic Messages API client.
//!
//! The PDF travels inline as a base64 `document` content block followed by
//! the instruction prompt, in a single user turn:
//!
//! ```text
//! POST /v1/messages
//! { "model": …, "max_tokens": 8000,
//!   "messages": [{ "role": "user", "content": [
//!       { "type": "document", "source": { "type": "base64",
//!         "media_type": "application/pdf", "data": "<base64>" } },
//!       { "type": "text", "text": "<prompt>" } ] }] }
//! ```

use super::http::decode_json;
use super::ModelClient;
use crate::credential::ApiKey;
use crate::error::VegaError;
use crate::pipeline::request::{ModelResponse, XtpRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Value of the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const PDF_MEDIA_TYPE: &str = "application/pdf";

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: ApiKey,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(http: reqwest::Client, api_key: ApiKey, base_url: &str) -> Self {
        Self {
            http,
            api_key,
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
        }
    }
}

impl ModelClient for AnthropicClient {
    fn provider(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: &XtpRequest<'_>) -> Result<ModelResponse, VegaError> {
        let data = request.document.to_base64();
        let body = messages_body(request, &data);

        info!("Calling Claude API ({})", request.model_id);
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let parsed: MessagesResponse = decode_json(self.provider(), response).await?;
        into_model_response(parsed)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Document { source: DocumentSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct DocumentSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

/// Build the request body. `pdf_base64` must outlive the body.
pub(crate) fn messages_body<'a>(
    request: &'a XtpRequest<'_>,
    pdf_base64: &'a str,
) -> MessagesRequest<'a> {
    MessagesRequest {
        model: &request.model_id,
        max_tokens: request.max_tokens,
        messages: vec![Message {
            role: "user",
            content: vec![
                ContentBlock::Document {
                    source: DocumentSource {
                        kind: "base64",
                        media_type: PDF_MEDIA_TYPE,
                        data: pdf_base64,
                    },
                },
                ContentBlock::Text {
                    text: &request.prompt,
                },
            ],
        }],
    }
}

/// Take the first text block, as the answer is always a single block.
pub(crate) fn into_model_response(parsed: MessagesResponse) -> Result<ModelResponse, VegaError> {
    if parsed.stop_reason.as_deref() == Some("max_tokens") {
        warn!("Claude stopped at the token limit; the test plan is probably truncated");
    }

    let text = parsed
        .content
        .into_iter()
        .find_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
        .ok_or_else(|| VegaError::EmptyResponse {
            provider: "anthropic".to_string(),
        })?;

    debug!("Claude returned {} chars", text.len());
    Ok(ModelResponse {
        text,
        input_tokens: parsed.usage.as_ref().map(|u| u.input_tokens),
        output_tokens: parsed.usage.as_ref().map(|u| u.output_tokens),
    })
}
