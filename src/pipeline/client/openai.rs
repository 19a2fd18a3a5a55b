//! OpenAI chat-completion client (text only).
//!
//! Chat completions have no PDF content block, so this backend sends the
//! prompt with the file's name and nothing else. It is kept for parity with
//! the other backends; `openai-assistant` is the one that actually reads the
//! document.
//!
//! The provider comes from [`ProviderFactory`], which reads `OPENAI_API_KEY`
//! itself. The credential resolver has already checked that variable.

use super::ModelClient;
use crate::error::VegaError;
use crate::pipeline::request::{ModelResponse, XtpRequest};
use crate::prompts::text_only_prompt;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct OpenAiChatClient {
    provider: Arc<dyn LLMProvider>,
}

impl OpenAiChatClient {
    /// Build an OpenAI provider for `model_id` from the environment.
    pub fn from_env(model_id: &str) -> Result<Self, VegaError> {
        let provider = ProviderFactory::create_llm_provider("openai", model_id).map_err(|e| {
            VegaError::ProviderNotConfigured {
                provider: "openai".to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self { provider })
    }
}

impl ModelClient for OpenAiChatClient {
    fn provider(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &XtpRequest<'_>) -> Result<ModelResponse, VegaError> {
        warn!(
            "OpenAI chat has limited PDF support: only the file name is sent. \
             For large PDFs use --model openai-assistant"
        );

        let messages = vec![ChatMessage::user(text_only_prompt(
            request.filename(),
            &request.prompt,
        ))];
        let options = build_options(request);

        info!("Calling OpenAI API ({})", request.model_id);
        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| VegaError::LlmApiError {
                message: format!("{e}"),
            })?;

        debug!(
            "OpenAI: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        if response.content.trim().is_empty() {
            return Err(VegaError::EmptyResponse {
                provider: "openai".to_string(),
            });
        }

        Ok(ModelResponse {
            text: response.content,
            input_tokens: Some(response.prompt_tokens as u64),
            output_tokens: Some(response.completion_tokens as u64),
        })
    }
}

fn build_options(request: &XtpRequest<'_>) -> CompletionOptions {
    CompletionOptions {
        max_tokens: Some(request.max_tokens as usize),
        ..Default::default()
    }
}
