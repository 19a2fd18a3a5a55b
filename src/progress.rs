//! Progress-callback trait for generation stage events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::XtpConfigBuilder::progress_callback`] to be told when each
//! pipeline stage starts and finishes, and to receive the remote status
//! strings the assistant backend sees while it polls a run.
//!
//! # Example
//!
//! ```rust
//! use vega_xtp::{GenerationProgressCallback, Stage, XtpConfig};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl GenerationProgressCallback for Printer {
//!     fn on_stage_start(&self, stage: Stage) {
//!         eprintln!("[{}/{}] {}", stage.number(), Stage::COUNT, stage.label());
//!     }
//! }
//!
//! let config = XtpConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// The three user-visible pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Load the PDF from disk.
    ReadPdf,
    /// Send the request and wait for the model's answer.
    Generate,
    /// Write the XTP file.
    Save,
}

impl Stage {
    pub const COUNT: usize = 3;

    /// 1-indexed position of the stage.
    pub fn number(self) -> usize {
        match self {
            Stage::ReadPdf => 1,
            Stage::Generate => 2,
            Stage::Save => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::ReadPdf => "Reading PDF",
            Stage::Generate => "Generating test plan",
            Stage::Save => "Saving XTP file",
        }
    }
}

/// Called by the generation pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully. Not called on failure.
    fn on_stage_complete(&self, stage: Stage) {
        let _ = stage;
    }

    /// Free-form status from the remote service (e.g. `queued`, `in_progress`).
    fn on_remote_status(&self, status: &str) {
        let _ = status;
    }

    /// Called once after the output file has been written.
    fn on_generation_complete(&self, output_path: &Path) {
        let _ = output_path;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::XtpConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
