//! Generation entry points.
//!
//! One run is a straight line of fallible steps; the first error ends it:
//!
//! 1. resolve the credential (no I/O, no network)
//! 2. read the PDF
//! 3. build the client and send the single request
//! 4. optionally clean the answer
//! 5. write the XTP file
//!
//! Nothing is written unless step 3 succeeds, so a service error leaves any
//! existing output file untouched.

use crate::config::XtpConfig;
use crate::credential::{resolve_api_key, resolve_api_key_with, ApiKey};
use crate::error::VegaError;
use crate::pipeline::client::{Backend, ModelClient};
use crate::pipeline::document::{load_pdf, PdfDocument};
use crate::pipeline::output::{derive_output_path, write_xtp};
use crate::pipeline::postprocess::clean_xtp;
use crate::pipeline::request::XtpRequest;
use crate::progress::Stage;
use crate::report::GenerationReport;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Generate an XTP for the PDF at `input`.
///
/// This is the primary entry point for the library. The credential is read
/// from the environment variable for `config.model`.
///
/// # Arguments
/// * `input` : path to a `.pdf` file
/// * `output`: where to write; defaults to `{stem}_testplan.xtp` next to the input
/// * `config`: generation configuration
///
/// # Errors
/// Any failure is returned as-is; see [`VegaError::kind`] for the three
/// families. No output file is created or modified on error.
pub async fn generate_xtp(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    config: &XtpConfig,
) -> Result<GenerationReport, VegaError> {
    let input = input.as_ref();
    log_start(input, config);
    let api_key = resolve_api_key(config.model)?;
    run(input, output, config, api_key, Backend::connect).await
}

/// [`generate_xtp`] with the environment lookup and the client constructor
/// supplied by the caller.
///
/// `connect` is only called once a credential has been found and the PDF has
/// been read.
pub async fn generate_xtp_with<L, F, C>(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    config: &XtpConfig,
    lookup: L,
    connect: F,
) -> Result<GenerationReport, VegaError>
where
    L: Fn(&str) -> Option<String>,
    F: FnOnce(&XtpConfig, ApiKey) -> Result<C, VegaError>,
    C: ModelClient,
{
    let input = input.as_ref();
    log_start(input, config);
    let api_key = resolve_api_key_with(config.model, lookup)?;
    run(input, output, config, api_key, connect).await
}

/// Steps after the credential is known: read, connect, generate, write.
async fn run<F, C>(
    input: &Path,
    output: Option<&Path>,
    config: &XtpConfig,
    api_key: ApiKey,
    connect: F,
) -> Result<GenerationReport, VegaError>
where
    F: FnOnce(&XtpConfig, ApiKey) -> Result<C, VegaError>,
    C: ModelClient,
{
    let started = Instant::now();

    // ── Read PDF ─────────────────────────────────────────────────────────
    let document = read_stage(input, config).await?;

    // ── Call, clean, write ───────────────────────────────────────────────
    let client = connect(config, api_key)?;
    finish(&client, &document, output, config, started).await
}

/// Generate with a client the caller already built.
///
/// Skips credential resolution; the client is assumed to carry its own.
pub async fn generate_xtp_with_client<C: ModelClient>(
    client: &C,
    input: impl AsRef<Path>,
    output: Option<&Path>,
    config: &XtpConfig,
) -> Result<GenerationReport, VegaError> {
    let started = Instant::now();
    let document = read_stage(input.as_ref(), config).await?;
    finish(client, &document, output, config, started).await
}

/// Blocking wrapper around [`generate_xtp`].
///
/// Creates a current-thread tokio runtime internally.
pub fn generate_xtp_sync(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    config: &XtpConfig,
) -> Result<GenerationReport, VegaError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(VegaError::RuntimeFailed)?
        .block_on(generate_xtp(input, output, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn log_start(input: &Path, config: &XtpConfig) {
    info!("Starting XTP generation: {} ({})", input.display(), config.model);
}

fn stage_start(config: &XtpConfig, stage: Stage) {
    info!("[{}/{}] {}...", stage.number(), Stage::COUNT, stage.label());
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
}

fn stage_complete(config: &XtpConfig, stage: Stage) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage);
    }
}

async fn read_stage(input: &Path, config: &XtpConfig) -> Result<PdfDocument, VegaError> {
    stage_start(config, Stage::ReadPdf);
    let document = load_pdf(input).await?;
    stage_complete(config, Stage::ReadPdf);
    Ok(document)
}

async fn finish<C: ModelClient>(
    client: &C,
    document: &PdfDocument,
    output: Option<&Path>,
    config: &XtpConfig,
    started: Instant,
) -> Result<GenerationReport, VegaError> {
    // ── Generate ─────────────────────────────────────────────────────────
    stage_start(config, Stage::Generate);
    let request = XtpRequest::new(document, config);
    let llm_start = Instant::now();
    let response = client.generate(&request).await?;
    info!(
        "Response received from {} in {}ms",
        client.provider(),
        llm_start.elapsed().as_millis()
    );
    stage_complete(config, Stage::Generate);

    let contents = if config.clean_output {
        clean_xtp(&response.text, document.filename())
    } else {
        response.text
    };

    // ── Save ─────────────────────────────────────────────────────────────
    stage_start(config, Stage::Save);
    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| derive_output_path(document.path()));
    write_xtp(&output_path, &contents).await?;
    stage_complete(config, Stage::Save);
    info!("Saved: {}", output_path.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(&output_path);
    }

    Ok(GenerationReport {
        output_path,
        model: config.model,
        model_id: request.model_id,
        pdf_bytes: document.len(),
        output_bytes: contents.len(),
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
        duration_ms: started.elapsed().as_millis() as u64,
        cleaned: config.clean_output,
    })
}
