//! Pipeline stages for PDF-to-XTP generation.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! document ──▶ request ──▶ client ──▶ postprocess ──▶ output
//!  (bytes)     (prompt)    (LLM)      (opt-in)        (file)
//! ```
//!
//! 1. [`document`]   : validate and read the input PDF
//! 2. [`request`]    : pair the document with the rendered prompt
//! 3. [`client`]     : the only stage with network I/O; one backend per
//!    [`crate::config::ModelKind`] behind the [`client::ModelClient`] trait
//! 4. [`postprocess`]: optional cleanup of fences and truncated XML
//! 5. [`output`]     : derive the output path and replace the file atomically

pub mod client;
pub mod document;
pub mod output;
pub mod postprocess;
pub mod request;
