//! Output writing: derive the XTP path and replace the file atomically.

use crate::error::VegaError;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Appended to the input's stem to name the output file.
pub const OUTPUT_SUFFIX: &str = "_testplan.xtp";

/// `dir/spec.pdf` → `dir/spec_testplan.xtp`.
///
/// The stem is kept byte-for-byte, so non-UTF-8 names survive.
pub fn derive_output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(OUTPUT_SUFFIX);
    input.with_file_name(name)
}

/// Write `contents` to `path`, replacing any existing file.
///
/// Uses atomic write (temp file + rename) so a failure never leaves a
/// half-written plan behind.
pub async fn write_xtp(path: &Path, contents: &str) -> Result<(), VegaError> {
    let write_err = |source| VegaError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = tmp_path_for(path);
    if let Err(e) = tokio::fs::write(&tmp_path, contents).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_from_stem() {
        assert_eq!(
            derive_output_path(Path::new("spec.pdf")),
            PathBuf::from("spec_testplan.xtp")
        );
    }

    #[test]
    fn keeps_directory() {
        assert_eq!(
            derive_output_path(Path::new("docs/v2/uart.PDF")),
            PathBuf::from("docs/v2/uart_testplan.xtp")
        );
    }

    #[test]
    fn only_last_extension_replaced() {
        assert_eq!(
            derive_output_path(Path::new("axi.rev3.pdf")),
            PathBuf::from("axi.rev3_testplan.xtp")
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_stem_is_preserved() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let input = PathBuf::from(OsStr::from_bytes(b"dir/spec\xff.pdf"));
        let out = derive_output_path(&input);
        assert_eq!(
            out.file_name().unwrap().to_os_string().into_vec(),
            b"spec\xff_testplan.xtp".to_vec()
        );
        assert_eq!(out.parent(), Some(Path::new("dir")));
    }

    #[test]
    fn tmp_path_sits_next_to_target() {
        assert_eq!(
            tmp_path_for(Path::new("out/plan.xtp")),
            PathBuf::from("out/plan.xtp.tmp")
        );
    }
}
