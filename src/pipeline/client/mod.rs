//! Model clients: turn an [`XtpRequest`] into generated text.
//!
//! This is the only stage with network I/O. Each [`ModelKind`] has one
//! client; [`Backend`] picks between them at runtime and is what the public
//! entry points use. Tests substitute their own [`ModelClient`].
//!
//! No client retries, streams, or sets a timeout. The first failure is
//! returned to the caller unchanged.

pub mod anthropic;
pub mod assistant;
mod http;
pub mod openai;

use crate::config::{ModelKind, XtpConfig};
use crate::credential::ApiKey;
use crate::error::VegaError;
use crate::pipeline::request::{ModelResponse, XtpRequest};
use std::future::Future;

pub use anthropic::AnthropicClient;
pub use assistant::AssistantClient;
pub use openai::OpenAiChatClient;

/// A service that can answer one [`XtpRequest`].
pub trait ModelClient {
    /// Provider name used in logs and error messages.
    fn provider(&self) -> &str;

    /// Send the request and wait for the full answer.
    fn generate(
        &self,
        request: &XtpRequest<'_>,
    ) -> impl Future<Output = Result<ModelResponse, VegaError>>;
}

/// The client selected by [`XtpConfig::model`].
pub enum Backend {
    Claude(AnthropicClient),
    OpenAi(OpenAiChatClient),
    Assistant(AssistantClient),
}

impl Backend {
    /// Construct the client for `config.model`. Makes no network calls.
    pub fn connect(config: &XtpConfig, api_key: ApiKey) -> Result<Self, VegaError> {
        Ok(match config.model {
            ModelKind::Claude => Backend::Claude(AnthropicClient::new(
                http::client()?,
                api_key,
                &config.anthropic_base_url,
            )),
            ModelKind::OpenAi => Backend::OpenAi(OpenAiChatClient::from_env(config.model_id())?),
            ModelKind::OpenAiAssistant => Backend::Assistant(AssistantClient::new(
                http::client()?,
                api_key,
                config,
            )),
        })
    }
}

impl ModelClient for Backend {
    fn provider(&self) -> &str {
        match self {
            Backend::Claude(c) => c.provider(),
            Backend::OpenAi(c) => c.provider(),
            Backend::Assistant(c) => c.provider(),
        }
    }

    async fn generate(&self, request: &XtpRequest<'_>) -> Result<ModelResponse, VegaError> {
        match self {
            Backend::Claude(c) => c.generate(request).await,
            Backend::OpenAi(c) => c.generate(request).await,
            Backend::Assistant(c) => c.generate(request).await,
        }
    }
}
