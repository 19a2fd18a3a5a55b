//! Error types for the vega-xtp library.
//!
//! Every failure in the pipeline is fatal: nothing is retried and nothing is
//! downgraded to a warning. [`VegaError`] carries enough context for a useful
//! terminal message, and [`VegaError::kind`] buckets each variant into one of
//! three [`ErrorKind`]s so callers can tell a setup problem from a file
//! problem from a remote-service problem without matching every variant.

use crate::config::ModelKind;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the vega-xtp library.
#[derive(Debug, Error)]
pub enum VegaError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The credential variable for the selected model is unset or blank.
    #[error("No API key found for model '{model}'.\nSet: {var}=your-key-here")]
    MissingCredential { model: ModelKind, var: &'static str },

    /// The LLM provider could not be constructed.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input does not carry a `.pdf` extension.
    #[error("File must be a PDF: '{path}'")]
    NotAPdf { path: PathBuf },

    /// Reading the input failed for a reason other than the ones above.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A custom prompt template file could not be read.
    #[error("Failed to read prompt template '{path}': {source}")]
    PromptReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output XTP file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tokio runtime behind the blocking wrapper could not start.
    #[error("Failed to start async runtime: {0}")]
    RuntimeFailed(#[source] std::io::Error),

    // ── Service errors ────────────────────────────────────────────────────
    /// The LLM API rejected the request or could not be reached.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The API returned HTTP 429.
    #[error("Rate limit exceeded for provider '{provider}'")]
    RateLimitExceeded {
        provider: String,
        retry_after_secs: Option<u64>,
    },

    /// The API returned an authentication error (401/403).
    #[error("Authentication error from provider '{provider}': {detail}")]
    AuthError { provider: String, detail: String },

    /// The response decoded fine but held no text to save.
    #[error("Provider '{provider}' returned no text content")]
    EmptyResponse { provider: String },

    /// An assistant run ended in a terminal state other than `completed`.
    #[error("Assistant run {status}: {detail}")]
    RunFailed { status: String, detail: String },
}

/// Coarse classification of a [`VegaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing credential or invalid settings; detected before any network activity.
    Configuration,
    /// Input unreadable or output unwritable.
    Io,
    /// Network failure or API-level rejection.
    Service,
}

impl VegaError {
    /// Which of the three failure families this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VegaError::MissingCredential { .. }
            | VegaError::ProviderNotConfigured { .. }
            | VegaError::InvalidConfig(_) => ErrorKind::Configuration,

            VegaError::FileNotFound { .. }
            | VegaError::PermissionDenied { .. }
            | VegaError::NotAPdf { .. }
            | VegaError::ReadFailed { .. }
            | VegaError::PromptReadFailed { .. }
            | VegaError::OutputWriteFailed { .. }
            | VegaError::RuntimeFailed(_) => ErrorKind::Io,

            VegaError::LlmApiError { .. }
            | VegaError::RateLimitExceeded { .. }
            | VegaError::AuthError { .. }
            | VegaError::EmptyResponse { .. }
            | VegaError::RunFailed { .. } => ErrorKind::Service,
        }
    }
}

impl From<reqwest::Error> for VegaError {
    fn from(e: reqwest::Error) -> Self {
        VegaError::LlmApiError {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_the_variable() {
        let e = VegaError::MissingCredential {
            model: ModelKind::Claude,
            var: "ANTHROPIC_API_KEY",
        };
        let msg = e.to_string();
        assert!(msg.contains("ANTHROPIC_API_KEY"), "got: {msg}");
        assert!(msg.contains("claude"), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn rate_limit_display() {
        let e = VegaError::RateLimitExceeded {
            provider: "anthropic".into(),
            retry_after_secs: Some(30),
        };
        assert!(e.to_string().contains("anthropic"));
        assert_eq!(e.kind(), ErrorKind::Service);
    }

    #[test]
    fn auth_error_display() {
        let e = VegaError::AuthError {
            provider: "openai".into(),
            detail: "invalid key".into(),
        };
        assert!(e.to_string().contains("openai"));
        assert!(e.to_string().contains("invalid key"));
    }

    #[test]
    fn io_kinds() {
        let missing = VegaError::FileNotFound {
            path: PathBuf::from("spec.pdf"),
        };
        assert_eq!(missing.kind(), ErrorKind::Io);

        let write = VegaError::OutputWriteFailed {
            path: PathBuf::from("out.xtp"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(write.kind(), ErrorKind::Io);
        assert!(write.to_string().contains("disk full"));
    }

    #[test]
    fn run_failed_display() {
        let e = VegaError::RunFailed {
            status: "expired".into(),
            detail: "no detail".into(),
        };
        assert_eq!(e.to_string(), "Assistant run expired: no detail");
        assert_eq!(e.kind(), ErrorKind::Service);
    }
}
