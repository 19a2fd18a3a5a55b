//! OpenAI Assistants (v2) client.
//!
//! The PDF is uploaded and indexed server-side, which lets large
//! specifications through that would not fit inline. One generation is a
//! fixed sequence of calls:
//!
//! ```text
//! upload file ─▶ create assistant ─▶ create vector store ─▶ add file
//!   ─▶ bind store to assistant ─▶ create thread ─▶ post prompt
//!   ─▶ create run ─▶ poll run until terminal ─▶ read newest message
//! ```
//!
//! Polling is not a retry: the run is created once and its status is read
//! every `poll_interval_secs` until it completes or fails.

use super::http::{decode_json, expect_success};
use super::ModelClient;
use crate::config::XtpConfig;
use crate::credential::ApiKey;
use crate::error::VegaError;
use crate::pipeline::document::PdfDocument;
use crate::pipeline::request::{ModelResponse, XtpRequest};
use crate::progress::ProgressCallback;
use crate::prompts::{ASSISTANT_INSTRUCTIONS, ASSISTANT_NAME, VECTOR_STORE_NAME};
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

const PROVIDER: &str = "openai";

pub struct AssistantClient {
    http: reqwest::Client,
    api_key: ApiKey,
    base_url: String,
    poll_interval: Duration,
    cleanup_remote: bool,
    progress: Option<ProgressCallback>,
}

impl AssistantClient {
    pub fn new(http: reqwest::Client, api_key: ApiKey, config: &XtpConfig) -> Self {
        Self {
            http,
            api_key,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            cleanup_remote: config.cleanup_remote,
            progress: config.progress_callback.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(self.url(path))
            .bearer_auth(self.api_key.expose())
            .header("OpenAI-Beta", "assistants=v2")
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.url(path))
            .bearer_auth(self.api_key.expose())
            .header("OpenAI-Beta", "assistants=v2")
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.http
            .delete(self.url(path))
            .bearer_auth(self.api_key.expose())
            .header("OpenAI-Beta", "assistants=v2")
    }

    fn report(&self, status: &str) {
        if let Some(ref cb) = self.progress {
            cb.on_remote_status(status);
        }
    }

    async fn upload_file(&self, document: &PdfDocument) -> Result<String, VegaError> {
        info!("Uploading PDF to OpenAI...");
        self.report("uploading");
        let part = Part::bytes(document.bytes().to_vec())
            .file_name(document.filename().to_string())
            .mime_str("application/pdf")?;
        let form = Form::new().text("purpose", "assistants").part("file", part);

        let created: Created = decode_json(PROVIDER, self.post("files").multipart(form).send().await?).await?;
        info!("File uploaded: {}", created.id);
        Ok(created.id)
    }

    async fn create_assistant(&self, model_id: &str) -> Result<String, VegaError> {
        let body = json!({
            "name": ASSISTANT_NAME,
            "instructions": ASSISTANT_INSTRUCTIONS,
            "model": model_id,
            "tools": [{"type": "file_search"}],
        });
        let created: Created = decode_json(PROVIDER, self.post("assistants").json(&body).send().await?).await?;
        info!("Assistant created: {}", created.id);
        Ok(created.id)
    }

    /// Everything after the assistant exists, up to the reply text.
    async fn converse(
        &self,
        file_id: &str,
        assistant_id: &str,
        prompt: &str,
    ) -> Result<String, VegaError> {
        let store: Created = decode_json(
            PROVIDER,
            self.post("vector_stores")
                .json(&json!({ "name": VECTOR_STORE_NAME }))
                .send()
                .await?,
        )
        .await?;
        debug!("Vector store created: {}", store.id);

        let _: Created = decode_json(
            PROVIDER,
            self.post(&format!("vector_stores/{}/files", store.id))
                .json(&json!({ "file_id": file_id }))
                .send()
                .await?,
        )
        .await?;

        let _: Created = decode_json(
            PROVIDER,
            self.post(&format!("assistants/{assistant_id}"))
                .json(&json!({
                    "tool_resources": {"file_search": {"vector_store_ids": [store.id]}}
                }))
                .send()
                .await?,
        )
        .await?;

        let thread: Created =
            decode_json(PROVIDER, self.post("threads").json(&json!({})).send().await?).await?;
        debug!("Thread created: {}", thread.id);

        let _: Created = decode_json(
            PROVIDER,
            self.post(&format!("threads/{}/messages", thread.id))
                .json(&json!({ "role": "user", "content": prompt }))
                .send()
                .await?,
        )
        .await?;

        info!("Analyzing specification (this may take 1-2 minutes)...");
        let run: Run = decode_json(
            PROVIDER,
            self.post(&format!("threads/{}/runs", thread.id))
                .json(&json!({ "assistant_id": assistant_id }))
                .send()
                .await?,
        )
        .await?;

        self.wait_for_run(&thread.id, run).await?;

        let messages: MessageList = decode_json(
            PROVIDER,
            self.get(&format!("threads/{}/messages", thread.id))
                .send()
                .await?,
        )
        .await?;
        latest_text(messages)
    }

    async fn wait_for_run(&self, thread_id: &str, mut run: Run) -> Result<(), VegaError> {
        loop {
            match run_state(&run.status) {
                RunState::Completed => return Ok(()),
                RunState::Failed => {
                    return Err(VegaError::RunFailed {
                        status: run.status,
                        detail: run
                            .last_error
                            .map(|e| e.describe())
                            .unwrap_or_else(|| "no detail".to_string()),
                    })
                }
                RunState::Pending => {
                    debug!("Run {} status: {}", run.id, run.status);
                    self.report(&run.status);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
            run = decode_json(
                PROVIDER,
                self.get(&format!("threads/{thread_id}/runs/{}", run.id))
                    .send()
                    .await?,
            )
            .await?;
        }
    }

    /// Best-effort removal of the uploaded file and, if one was created, the
    /// assistant.
    async fn cleanup(&self, file_id: &str, assistant_id: Option<&str>) {
        let paths = std::iter::once(format!("files/{file_id}"))
            .chain(assistant_id.map(|id| format!("assistants/{id}")));
        for path in paths {
            let result = match self.delete(&path).send().await {
                Ok(resp) => expect_success(PROVIDER, resp).await,
                Err(e) => Err(e.into()),
            };
            match result {
                Ok(()) => info!("Deleted {}", path),
                Err(e) => warn!("Cleanup of {} failed: {}", path, e),
            }
        }
    }
}

impl ModelClient for AssistantClient {
    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, request: &XtpRequest<'_>) -> Result<ModelResponse, VegaError> {
        let file_id = self.upload_file(request.document).await?;

        // Once the file exists remotely, every outcome goes through cleanup.
        let (assistant_id, result) = match self.create_assistant(&request.model_id).await {
            Ok(id) => {
                let result = self.converse(&file_id, &id, &request.prompt).await;
                (Some(id), result)
            }
            Err(e) => (None, Err(e)),
        };

        if self.cleanup_remote {
            self.cleanup(&file_id, assistant_id.as_deref()).await;
        }

        result.map(ModelResponse::from_text)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Run {
    id: String,
    status: String,
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RunError {
    code: Option<String>,
    message: Option<String>,
}

impl RunError {
    fn describe(self) -> String {
        match (self.code, self.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message,
            (Some(code), None) => code,
            (None, None) => "no detail".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    #[serde(default)]
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessageContent {
    Text {
        text: TextValue,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

#[derive(Debug, PartialEq, Eq)]
enum RunState {
    Completed,
    Failed,
    Pending,
}

fn run_state(status: &str) -> RunState {
    match status {
        "completed" => RunState::Completed,
        "failed" | "cancelled" | "expired" | "incomplete" => RunState::Failed,
        _ => RunState::Pending,
    }
}

/// Messages are listed newest first; the reply is the first text part.
fn latest_text(list: MessageList) -> Result<String, VegaError> {
    list.data
        .into_iter()
        .next()
        .and_then(|m| {
            m.content.into_iter().find_map(|c| match c {
                MessageContent::Text { text } => Some(text.value),
                MessageContent::Other => None,
            })
        })
        .ok_or_else(|| VegaError::EmptyResponse {
            provider: PROVIDER.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelKind;

    #[test]
    fn run_states() {
        assert_eq!(run_state("completed"), RunState::Completed);
        assert_eq!(run_state("queued"), RunState::Pending);
        assert_eq!(run_state("in_progress"), RunState::Pending);
        assert_eq!(run_state("requires_action"), RunState::Pending);
        for s in ["failed", "cancelled", "expired", "incomplete"] {
            assert_eq!(run_state(s), RunState::Failed, "{s}");
        }
    }

    #[test]
    fn latest_message_text_is_returned() {
        let list: MessageList = serde_json::from_value(json!({
            "object": "list",
            "data": [
                {"id": "msg_2", "role": "assistant", "content": [
                    {"type": "text", "text": {"value": "<testplan/>", "annotations": []}}
                ]},
                {"id": "msg_1", "role": "user", "content": [
                    {"type": "text", "text": {"value": "prompt", "annotations": []}}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(latest_text(list).unwrap(), "<testplan/>");
    }

    #[test]
    fn image_only_reply_is_empty_response() {
        let list: MessageList = serde_json::from_value(json!({
            "data": [{"content": [{"type": "image_file", "image_file": {"file_id": "f"}}]}]
        }))
        .unwrap();
        assert!(matches!(
            latest_text(list),
            Err(VegaError::EmptyResponse { .. })
        ));
    }

    #[test]
    fn run_error_description() {
        let e = RunError {
            code: Some("rate_limit_exceeded".into()),
            message: Some("slow down".into()),
        };
        assert_eq!(e.describe(), "rate_limit_exceeded: slow down");
    }

    #[test]
    fn urls_are_versioned() {
        let config = XtpConfig::builder()
            .model(ModelKind::OpenAiAssistant)
            .openai_base_url("http://127.0.0.1:8080/")
            .poll_interval_secs(2)
            .build()
            .unwrap();
        let client = AssistantClient::new(reqwest::Client::new(), ApiKey::new("k"), &config);
        assert_eq!(client.url("threads"), "http://127.0.0.1:8080/v1/threads");
        assert_eq!(client.poll_interval, Duration::from_secs(2));
    }
}
