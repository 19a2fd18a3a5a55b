//! Offline integration tests for the generation pipeline.
//!
//! A scripted `ModelClient` stands in for the remote service so these run
//! without credentials or network access.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vega_xtp::{
    generate_xtp_with, generate_xtp_with_client, ApiKey, ErrorKind, GenerationProgressCallback,
    ModelClient, ModelKind, ModelResponse, Stage, VegaError, XtpConfig, XtpRequest,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

const PLAN: &str = "<testplan>...</testplan>";

/// Returns a canned answer (or error) and records what it was asked.
struct ScriptedClient {
    answer: Result<String, String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_len: AtomicUsize,
}

impl ScriptedClient {
    fn answering(text: &str) -> Self {
        Self {
            answer: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_len: AtomicUsize::new(0),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            ..Self::answering("")
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModelClient for ScriptedClient {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &XtpRequest<'_>) -> Result<ModelResponse, VegaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());
        self.last_len
            .store(request.document.len(), Ordering::SeqCst);
        match &self.answer {
            Ok(text) => Ok(ModelResponse::from_text(text.clone())),
            Err(message) => Err(VegaError::LlmApiError {
                message: message.clone(),
            }),
        }
    }
}

fn write_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4\n% test document\n%%EOF\n").unwrap();
    path
}

fn key_present(name: &str) -> Option<String> {
    (name == "ANTHROPIC_API_KEY").then(|| "sk-ant-test".to_string())
}

fn no_keys(_: &str) -> Option<String> {
    None
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn writes_response_verbatim_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "spec.pdf");
    let client = ScriptedClient::answering(PLAN);

    let report = generate_xtp_with_client(&client, &pdf, None, &XtpConfig::default())
        .await
        .expect("generation must succeed");

    let expected = dir.path().join("spec_testplan.xtp");
    assert_eq!(report.output_path, expected);
    assert_eq!(std::fs::read_to_string(&expected).unwrap(), PLAN);
    assert_eq!(client.calls(), 1);
    assert_eq!(report.output_bytes, PLAN.len());
    assert!(!report.cleaned);
}

#[tokio::test]
async fn request_carries_whole_pdf_and_filename() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "uart_spec.pdf");
    let size = std::fs::metadata(&pdf).unwrap().len() as usize;
    let client = ScriptedClient::answering(PLAN);

    generate_xtp_with_client(&client, &pdf, None, &XtpConfig::default())
        .await
        .unwrap();

    assert_eq!(client.last_len.load(Ordering::SeqCst), size);
    let prompt = client.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("uart_spec.pdf"), "prompt: {prompt}");
    assert!(!prompt.contains("{filename}"));
}

#[tokio::test]
async fn overwrites_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "spec.pdf");
    let out = dir.path().join("spec_testplan.xtp");
    std::fs::write(&out, "stale plan from an earlier run").unwrap();

    let client = ScriptedClient::answering(PLAN);
    generate_xtp_with_client(&client, &pdf, None, &XtpConfig::default())
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), PLAN);
    assert!(!dir.path().join("spec_testplan.xtp.tmp").exists());
}

#[tokio::test]
async fn explicit_output_path_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "spec.pdf");
    let out = dir.path().join("plans/nested/my_plan.xtp");

    let client = ScriptedClient::answering(PLAN);
    let report = generate_xtp_with_client(&client, &pdf, Some(&out), &XtpConfig::default())
        .await
        .unwrap();

    assert_eq!(report.output_path, out);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), PLAN);
    assert!(!dir.path().join("spec_testplan.xtp").exists());
}

#[tokio::test]
async fn clean_mode_strips_fences_and_adds_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "spec.pdf");
    let client = ScriptedClient::answering(
        "Here is the plan:\n```xml\n<testplan name=\"t\"><requirements/></testplan>\n```\n",
    );
    let config = XtpConfig::builder().clean_output(true).build().unwrap();

    let report = generate_xtp_with_client(&client, &pdf, None, &config)
        .await
        .unwrap();

    let written = std::fs::read_to_string(&report.output_path).unwrap();
    assert!(written.starts_with("<?xml"), "got: {written}");
    assert!(written.contains("<testplan name=\"t\">"));
    assert!(!written.contains("```"));
    assert!(!written.contains("Here is the plan"));
    assert!(report.cleaned);
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn service_error_leaves_existing_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "spec.pdf");
    let out = dir.path().join("spec_testplan.xtp");
    std::fs::write(&out, "previous plan").unwrap();

    let client = ScriptedClient::failing("HTTP 500: overloaded");
    let err = generate_xtp_with_client(&client, &pdf, None, &XtpConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Service);
    assert!(err.to_string().contains("overloaded"));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "previous plan");
}

#[tokio::test]
async fn service_error_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "spec.pdf");

    let client = ScriptedClient::failing("connection refused");
    generate_xtp_with_client(&client, &pdf, None, &XtpConfig::default())
        .await
        .unwrap_err();

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("spec.pdf")]);
}

#[tokio::test]
async fn missing_credential_never_connects() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "spec.pdf");
    let connects = AtomicUsize::new(0);

    let err = generate_xtp_with(&pdf, None, &XtpConfig::default(), no_keys, |_, _| {
        connects.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedClient::answering(PLAN))
    })
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    assert_eq!(connects.load(Ordering::SeqCst), 0);
    assert!(!dir.path().join("spec_testplan.xtp").exists());
}

#[tokio::test]
async fn missing_credential_is_checked_before_the_file() {
    // The PDF does not exist either; the credential error must win.
    let config = XtpConfig::builder()
        .model(ModelKind::OpenAiAssistant)
        .build()
        .unwrap();
    let err = generate_xtp_with(
        "does/not/exist.pdf",
        None,
        &config,
        no_keys,
        |_, _| Ok(ScriptedClient::answering(PLAN)),
    )
    .await
    .unwrap_err();

    match err {
        VegaError::MissingCredential { var, .. } => assert_eq!(var, "OPENAI_API_KEY"),
        other => panic!("expected MissingCredential, got {other:?}"),
    }
}

#[tokio::test]
async fn credential_is_handed_to_the_client_constructor() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "spec.pdf");
    let seen = Mutex::new(None::<String>);

    generate_xtp_with(&pdf, None, &XtpConfig::default(), key_present, |_, key: ApiKey| {
        *seen.lock().unwrap() = Some(key.expose().to_string());
        Ok(ScriptedClient::answering(PLAN))
    })
    .await
    .unwrap();

    assert_eq!(seen.lock().unwrap().as_deref(), Some("sk-ant-test"));
}

#[tokio::test]
async fn nonexistent_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::answering(PLAN);

    let err = generate_xtp_with_client(
        &client,
        dir.path().join("missing.pdf"),
        None,
        &XtpConfig::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, VegaError::FileNotFound { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn non_pdf_input_is_rejected_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let txt = dir.path().join("notes.txt");
    std::fs::write(&txt, "plain text").unwrap();
    let client = ScriptedClient::answering(PLAN);

    let err = generate_xtp_with_client(&client, &txt, None, &XtpConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, VegaError::NotAPdf { .. }), "got {err:?}");
    assert_eq!(client.calls(), 0);
}

// ── Progress callbacks ───────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl GenerationProgressCallback for Recorder {
    fn on_stage_start(&self, stage: Stage) {
        self.events.lock().unwrap().push(format!("start {}", stage.number()));
    }

    fn on_stage_complete(&self, stage: Stage) {
        self.events.lock().unwrap().push(format!("done {}", stage.number()));
    }

    fn on_generation_complete(&self, output_path: &Path) {
        let name = output_path.file_name().unwrap().to_string_lossy();
        self.events.lock().unwrap().push(format!("saved {name}"));
    }
}

#[tokio::test]
async fn stages_are_reported_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "spec.pdf");
    let recorder = Arc::new(Recorder::default());
    let config = XtpConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    generate_xtp_with_client(&ScriptedClient::answering(PLAN), &pdf, None, &config)
        .await
        .unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start 1",
            "done 1",
            "start 2",
            "done 2",
            "start 3",
            "done 3",
            "saved spec_testplan.xtp",
        ]
    );
}

#[tokio::test]
async fn failed_stage_is_never_completed() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "spec.pdf");
    let recorder = Arc::new(Recorder::default());
    let config = XtpConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    generate_xtp_with_client(&ScriptedClient::failing("boom"), &pdf, None, &config)
        .await
        .unwrap_err();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(events, vec!["start 1", "done 1", "start 2"]);
}
