//! Result types returned by the generation entry points.

use crate::config::ModelKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of a successful generation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationReport {
    /// Where the XTP was written.
    pub output_path: PathBuf,
    pub model: ModelKind,
    /// Provider model identifier that was sent.
    pub model_id: String,
    /// Size of the input PDF.
    pub pdf_bytes: usize,
    /// Size of the written file.
    pub output_bytes: usize,
    /// Prompt tokens, if the provider reported them.
    pub input_tokens: Option<u64>,
    /// Completion tokens, if the provider reported them.
    pub output_tokens: Option<u64>,
    /// Wall-clock time from start to file written.
    pub duration_ms: u64,
    /// Whether post-processing ran before writing.
    pub cleaned: bool,
}
