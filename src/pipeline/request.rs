//! Request building: pair the loaded document with the rendered prompt.
//!
//! The request is backend-neutral. Each client in [`super::client`] turns it
//! into its own wire format.

use crate::config::XtpConfig;
use crate::pipeline::document::PdfDocument;
use crate::prompts::{render_prompt, XTP_PROMPT_TEMPLATE};

/// Everything a backend needs for one generation call.
#[derive(Debug, Clone)]
pub struct XtpRequest<'a> {
    pub document: &'a PdfDocument,
    /// Instruction prompt with the file name substituted.
    pub prompt: String,
    pub model_id: String,
    pub max_tokens: u32,
}

impl<'a> XtpRequest<'a> {
    /// Build the request for `document` under `config`.
    pub fn new(document: &'a PdfDocument, config: &XtpConfig) -> Self {
        let template = config
            .prompt_template
            .as_deref()
            .unwrap_or(XTP_PROMPT_TEMPLATE);
        Self {
            document,
            prompt: render_prompt(template, document.filename()),
            model_id: config.model_id().to_string(),
            max_tokens: config.max_tokens,
        }
    }

    pub fn filename(&self) -> &str {
        self.document.filename()
    }
}

/// Generated text plus whatever usage the provider reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub text: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

impl ModelResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelKind;

    #[test]
    fn default_request_uses_builtin_prompt() {
        let doc = PdfDocument::from_bytes("specs/i2c.pdf", b"%PDF".to_vec());
        let req = XtpRequest::new(&doc, &XtpConfig::default());
        assert!(req.prompt.contains("Analyze the specification document: i2c.pdf"));
        assert_eq!(req.model_id, "claude-sonnet-4-20250514");
        assert_eq!(req.max_tokens, 8000);
        assert_eq!(req.filename(), "i2c.pdf");
    }

    #[test]
    fn custom_template_and_model() {
        let doc = PdfDocument::from_bytes("dma.pdf", Vec::new());
        let config = XtpConfig::builder()
            .model(ModelKind::OpenAi)
            .prompt_template("Plan tests for {filename}.")
            .max_tokens(1000)
            .build()
            .unwrap();
        let req = XtpRequest::new(&doc, &config);
        assert_eq!(req.prompt, "Plan tests for dma.pdf.");
        assert_eq!(req.model_id, "gpt-4o");
        assert_eq!(req.max_tokens, 1000);
    }
}
