//! Document loading: validate the input path and read the PDF into memory.
//!
//! The whole file is read in one go. There is no size cap; a PDF the API
//! will not accept fails at the service, not here.

use crate::error::VegaError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A PDF read from disk.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    path: PathBuf,
    filename: String,
    bytes: Vec<u8>,
}

impl PdfDocument {
    /// Build a document from bytes already in memory.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Self {
            path,
            filename,
            bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, e.g. `spec.pdf`.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 of the file, as the document content block expects.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// True if `path` ends in `.pdf`, ignoring case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Read the PDF at `path`.
pub async fn load_pdf(path: &Path) -> Result<PdfDocument, VegaError> {
    if !has_pdf_extension(path) {
        return Err(VegaError::NotAPdf {
            path: path.to_path_buf(),
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        IoErrorKind::NotFound => VegaError::FileNotFound {
            path: path.to_path_buf(),
        },
        IoErrorKind::PermissionDenied => VegaError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => VegaError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if !bytes.starts_with(b"%PDF") {
        warn!(
            "{} has no %PDF header; sending it anyway",
            path.display()
        );
    }

    let doc = PdfDocument::from_bytes(path, bytes);
    info!(
        "Read PDF: {} ({:.1} KB)",
        path.display(),
        doc.len() as f64 / 1024.0
    );
    Ok(doc)
}
