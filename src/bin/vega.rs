//! CLI binary for vega-xtp.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `XtpConfig`, shows stage progress, and prints the output path.

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vega_xtp::{
    generate_xtp, GenerationProgressCallback, GenerationReport, ModelKind, PromptSource, Stage,
    XtpConfig,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner showing the current stage, with a tick line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar
            .set_prefix(format!("[{}/{}]", stage.number(), Stage::COUNT));
        self.bar.set_message(format!("{}…", stage.label()));
        if stage == Stage::Generate {
            self.bar
                .println(dim("      (this may take 30-60 seconds)"));
        }
    }

    fn on_stage_complete(&self, stage: Stage) {
        self.bar.println(format!(
            "  {} {}",
            green("✓"),
            stage.label()
        ));
    }

    fn on_remote_status(&self, status: &str) {
        self.bar
            .set_message(format!("{}…  {}", Stage::Generate.label(), dim(status)));
    }

    fn on_generation_complete(&self, _output_path: &Path) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Claude (default), writes spec_testplan.xtp next to the PDF
  vega spec.pdf

  # Large PDFs: upload to OpenAI and search server-side
  vega spec.pdf --model openai-assistant

  # Explicit output file, cleaned into well-formed XML
  vega spec.pdf --model claude --output my_plan.xtp --clean

  # JSON report instead of the bare output path
  vega spec.pdf --json

MODELS:
  claude             Anthropic Claude, PDF attached inline   (ANTHROPIC_API_KEY)
  openai             OpenAI GPT-4o, file name only           (OPENAI_API_KEY)
  openai-assistant   OpenAI Assistants with file storage     (OPENAI_API_KEY)

MODEL RECOMMENDATIONS:
  Small PDFs (<500KB):   claude or openai
  Large PDFs (>500KB):   openai-assistant
  Best quality:          claude

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY   Credential for the claude model
  OPENAI_API_KEY      Credential for the openai models
  RUST_LOG            Override the log filter (e.g. vega_xtp=debug)
  VEGA_*              Flag fallbacks (VEGA_MODEL, VEGA_QUIET=1, ...); switches
                      treat empty, 0, false, no and off as unset
"#;

/// Generate XML test plans from PDF specifications using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "vega",
    version,
    about = "Generate XML test plans (XTP) from PDF specifications using LLMs",
    long_about = "Send a PDF specification to an LLM and save the generated XML test plan \
(requirements, test suites, test cases) next to it. Supports Anthropic Claude and OpenAI \
(chat or Assistants with file storage).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF specification.
    input: PathBuf,

    /// Model backend.
    #[arg(short, long, env = "VEGA_MODEL", value_enum, default_value = "claude")]
    model: ModelArg,

    /// Output file path. Default: <input stem>_testplan.xtp next to the input.
    #[arg(short, long, env = "VEGA_OUTPUT")]
    output: Option<PathBuf>,

    /// Provider model ID override (e.g. claude-sonnet-4-20250514, gpt-4o).
    #[arg(long, env = "VEGA_MODEL_ID")]
    model_id: Option<String>,

    /// Max output tokens.
    #[arg(long, env = "VEGA_MAX_TOKENS", default_value_t = 8000,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_tokens: u32,

    /// Strip markdown fences and complete truncated XML before saving.
    #[arg(long, env = "VEGA_CLEAN", value_parser = FalseyValueParser::new())]
    clean: bool,

    /// Text file replacing the built-in prompt; `{filename}` is substituted.
    #[arg(long, env = "VEGA_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Seconds between assistant run status checks (openai-assistant only).
    #[arg(long, env = "VEGA_POLL_INTERVAL", default_value_t = 5,
          value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: u64,

    /// Delete the uploaded file and assistant afterwards (openai-assistant only).
    #[arg(long, env = "VEGA_CLEANUP", value_parser = FalseyValueParser::new())]
    cleanup: bool,

    /// Print a JSON report instead of the output path.
    #[arg(long, env = "VEGA_JSON", value_parser = FalseyValueParser::new())]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "VEGA_NO_PROGRESS", value_parser = FalseyValueParser::new())]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "VEGA_VERBOSE", value_parser = FalseyValueParser::new())]
    verbose: bool,

    /// Suppress all output except errors and the output path.
    #[arg(short, long, env = "VEGA_QUIET", value_parser = FalseyValueParser::new())]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModelArg {
    Claude,
    Openai,
    OpenaiAssistant,
}

impl From<ModelArg> for ModelKind {
    fn from(v: ModelArg) -> Self {
        match v {
            ModelArg::Claude => ModelKind::Claude,
            ModelArg::Openai => ModelKind::OpenAi,
            ModelArg::OpenaiAssistant => ModelKind::OpenAiAssistant,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers INFO-level progress; keep warnings visible.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let model = ModelKind::from(cli.model);
    if !cli.quiet && !cli.json {
        print_banner(&cli.input, model, cli.output.as_deref());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(&cli, progress.clone()).await?;

    // ── Run generation ───────────────────────────────────────────────────
    let result = generate_xtp(&cli.input, cli.output.as_deref(), &config).await;
    if let Some(ref p) = progress {
        p.bar.finish_and_clear();
    }
    let report = result.context("Failed to generate test plan")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else {
        if !cli.quiet {
            print_summary(&report);
        }
        println!("{}", report.output_path.display());
    }

    Ok(())
}

/// Map CLI args to `XtpConfig`.
async fn build_config(
    cli: &Cli,
    progress: Option<Arc<CliProgressCallback>>,
) -> Result<XtpConfig> {
    let prompt_source = match cli.prompt_file {
        Some(ref path) => PromptSource::File(path.clone()),
        None => PromptSource::Builtin,
    };
    let prompt_template = prompt_source
        .load()
        .await
        .context("Failed to load prompt template")?;

    let mut builder = XtpConfig::builder()
        .model(cli.model.into())
        .max_tokens(cli.max_tokens)
        .clean_output(cli.clean)
        .poll_interval_secs(cli.poll_interval)
        .cleanup_remote(cli.cleanup);

    if let Some(ref id) = cli.model_id {
        builder = builder.model_id(id.clone());
    }
    if let Some(template) = prompt_template {
        builder = builder.prompt_template(template);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_banner(input: &Path, model: ModelKind, output: Option<&Path>) {
    eprintln!();
    eprintln!("{}", bold("VEGA XTP Generator"));
    eprintln!("{}", dim("AI-powered test plan generation from PDF"));
    eprintln!();
    eprintln!("{} PDF:    {}", cyan("◆"), input.display());
    eprintln!("{} Model:  {}", cyan("◆"), model);
    if let Some(out) = output {
        eprintln!("{} Output: {}", cyan("◆"), out.display());
    }
    eprintln!();
}

fn print_summary(report: &GenerationReport) {
    eprintln!(
        "{}  Test plan generated  {}  {}ms  →  {}",
        green("✔"),
        dim(&format!("{} bytes", report.output_bytes)),
        report.duration_ms,
        bold(&report.output_path.display().to_string()),
    );
    if let (Some(input), Some(output)) = (report.input_tokens, report.output_tokens) {
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&input.to_string()),
            dim(&output.to_string()),
        );
    }
}
