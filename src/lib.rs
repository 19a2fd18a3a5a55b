//! # vega-xtp
//!
//! Generate XML verification test plans (XTP) from PDF specifications by
//! handing the document to a large language model.
//!
//! The crate does no PDF parsing of its own. It reads the file, attaches it to
//! one request with a fixed instruction prompt, waits for the answer, and
//! writes that answer to `{stem}_testplan.xtp`. Post-processing into
//! well-formed XML is opt-in.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Credential  ANTHROPIC_API_KEY / OPENAI_API_KEY, checked first
//!  ├─ 2. Document    read the whole file
//!  ├─ 3. Request     document + XTP prompt
//!  ├─ 4. Client      claude | openai | openai-assistant (one call, no retry)
//!  ├─ 5. Polish      optional fence stripping / XML completion
//!  └─ 6. Output      atomic write, replacing any previous plan
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vega_xtp::{generate_xtp, XtpConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = XtpConfig::default();
//!     let report = generate_xtp("uart_spec.pdf", None, &config).await?;
//!     println!("{}", report.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `vega` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Choosing a Model
//!
//! | Model | Sees the PDF | Best for |
//! |-------|--------------|----------|
//! | `claude` | inline document block | Default; small and medium PDFs, best quality |
//! | `openai` | file name only | Quick experiments |
//! | `openai-assistant` | uploaded + file_search | Large PDFs (> 500 KB) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod credential;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ModelKind, PromptSource, XtpConfig, XtpConfigBuilder};
pub use credential::{resolve_api_key, ApiKey};
pub use error::{ErrorKind, VegaError};
pub use generate::{generate_xtp, generate_xtp_sync, generate_xtp_with, generate_xtp_with_client};
pub use pipeline::client::{Backend, ModelClient};
pub use pipeline::document::PdfDocument;
pub use pipeline::output::{derive_output_path, OUTPUT_SUFFIX};
pub use pipeline::request::{ModelResponse, XtpRequest};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
pub use report::GenerationReport;
