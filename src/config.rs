//! Configuration types for XTP generation.
//!
//! All generation behaviour is controlled through [`XtpConfig`], built via its
//! [`XtpConfigBuilder`]. Defaults mirror what the command-line tool does with
//! no flags: Claude, 8000 output tokens, verbatim output.

use crate::error::VegaError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default Anthropic API origin.
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Default OpenAI API origin.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Which backend generates the test plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelKind {
    /// Anthropic Claude with the PDF attached as a document block. (default)
    #[default]
    #[serde(rename = "claude")]
    Claude,
    /// OpenAI chat completion. The PDF is referenced by name only.
    #[serde(rename = "openai")]
    OpenAi,
    /// OpenAI Assistants: the PDF is uploaded and searched server-side.
    #[serde(rename = "openai-assistant")]
    OpenAiAssistant,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::Claude,
        ModelKind::OpenAi,
        ModelKind::OpenAiAssistant,
    ];

    /// Name used on the command line and in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Claude => "claude",
            ModelKind::OpenAi => "openai",
            ModelKind::OpenAiAssistant => "openai-assistant",
        }
    }

    /// Environment variable holding the credential for this backend.
    pub fn credential_var(self) -> &'static str {
        match self {
            ModelKind::Claude => "ANTHROPIC_API_KEY",
            ModelKind::OpenAi | ModelKind::OpenAiAssistant => "OPENAI_API_KEY",
        }
    }

    /// Provider model identifier used when none is configured.
    pub fn default_model_id(self) -> &'static str {
        match self {
            ModelKind::Claude => "claude-sonnet-4-20250514",
            ModelKind::OpenAi | ModelKind::OpenAiAssistant => "gpt-4o",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a single XTP generation run.
///
/// # Example
/// ```rust
/// use vega_xtp::{ModelKind, XtpConfig};
///
/// let config = XtpConfig::builder()
///     .model(ModelKind::OpenAiAssistant)
///     .clean_output(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.model_id(), "gpt-4o");
/// ```
#[derive(Clone)]
pub struct XtpConfig {
    /// Backend used for generation. Default: [`ModelKind::Claude`].
    pub model: ModelKind,

    /// Provider model identifier. If None, uses [`ModelKind::default_model_id`].
    pub model_id: Option<String>,

    /// Maximum tokens the model may generate. Default: 8000.
    ///
    /// A full test plan for a mid-sized specification routinely runs to several
    /// thousand tokens; too low a cap truncates the XML mid-element.
    pub max_tokens: u32,

    /// Post-process the response into well-formed XTP (strip fences, add the
    /// XML declaration, close a truncated plan). Default: false, which saves
    /// the response verbatim.
    pub clean_output: bool,

    /// Custom prompt template. `{filename}` is replaced with the PDF's file
    /// name. If None, uses [`crate::prompts::XTP_PROMPT_TEMPLATE`].
    pub prompt_template: Option<String>,

    /// Anthropic API origin. Default: [`DEFAULT_ANTHROPIC_BASE_URL`].
    pub anthropic_base_url: String,

    /// OpenAI API origin used by the assistant backend. Default: [`DEFAULT_OPENAI_BASE_URL`].
    pub openai_base_url: String,

    /// Seconds between assistant run status polls. Default: 5.
    pub poll_interval_secs: u64,

    /// Delete the uploaded file and the assistant once the run finishes. Default: false.
    pub cleanup_remote: bool,

    /// Optional per-stage progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for XtpConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            model_id: None,
            max_tokens: 8000,
            clean_output: false,
            prompt_template: None,
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            poll_interval_secs: 5,
            cleanup_remote: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for XtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XtpConfig")
            .field("model", &self.model)
            .field("model_id", &self.model_id)
            .field("max_tokens", &self.max_tokens)
            .field("clean_output", &self.clean_output)
            .field("prompt_template", &self.prompt_template.as_ref().map(|t| t.len()))
            .field("anthropic_base_url", &self.anthropic_base_url)
            .field("openai_base_url", &self.openai_base_url)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("cleanup_remote", &self.cleanup_remote)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn GenerationProgressCallback>"),
            )
            .finish()
    }
}

impl XtpConfig {
    /// Create a new builder for `XtpConfig`.
    pub fn builder() -> XtpConfigBuilder {
        XtpConfigBuilder {
            config: Self::default(),
        }
    }

    /// The provider model identifier that will actually be sent.
    pub fn model_id(&self) -> &str {
        self.model_id
            .as_deref()
            .unwrap_or_else(|| self.model.default_model_id())
    }
}

/// Builder for [`XtpConfig`].
#[derive(Debug)]
pub struct XtpConfigBuilder {
    config: XtpConfig,
}

impl XtpConfigBuilder {
    pub fn model(mut self, model: ModelKind) -> Self {
        self.config.model = model;
        self
    }

    pub fn model_id(mut self, id: impl Into<String>) -> Self {
        self.config.model_id = Some(id.into());
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn clean_output(mut self, v: bool) -> Self {
        self.config.clean_output = v;
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = Some(template.into());
        self
    }

    pub fn anthropic_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.anthropic_base_url = url.into();
        self
    }

    pub fn openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.openai_base_url = url.into();
        self
    }

    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.config.poll_interval_secs = secs;
        self
    }

    pub fn cleanup_remote(mut self, v: bool) -> Self {
        self.config.cleanup_remote = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<XtpConfig, VegaError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(VegaError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.poll_interval_secs == 0 {
            return Err(VegaError::InvalidConfig(
                "poll interval must be ≥ 1 second".into(),
            ));
        }
        if c.model_id.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(VegaError::InvalidConfig("model id must not be blank".into()));
        }
        for url in [&c.anthropic_base_url, &c.openai_base_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(VegaError::InvalidConfig(format!(
                    "API base URL must be http(s), got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}

/// Where the prompt template comes from, resolved by the CLI.
#[derive(Debug, Clone)]
pub enum PromptSource {
    /// The built-in XTP prompt.
    Builtin,
    /// A UTF-8 file whose contents replace the built-in prompt.
    File(PathBuf),
}

impl PromptSource {
    /// Load the template text, or `None` for the built-in prompt.
    pub async fn load(&self) -> Result<Option<String>, VegaError> {
        match self {
            PromptSource::Builtin => Ok(None),
            PromptSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map(Some)
                .map_err(|source| VegaError::PromptReadFailed {
                    path: path.clone(),
                    source,
                }),
        }
    }
}
