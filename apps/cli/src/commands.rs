//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docreview_oracle::OpenAiOracle;
use docreview_review::ReviewService;
use docreview_runs::{ReviewInput, ReviewRequest, RunStore, cancel_run, start_review};
use docreview_shared::{
    AppConfig, EventKind, Mode, RunStatus, config_file_path, init_config, load_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docreview CLI entry point.
#[derive(Parser)]
#[command(
    name = "docreview",
    version,
    about = "Review PRD/TRD/test-case documents against an oracle-planned checklist.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Review a document and write the findings as Markdown.
    Review {
        /// Path to the document (.md, .markdown, or .txt).
        file: Option<PathBuf>,

        /// Review the given text instead of a file.
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Review mode: prd, trd, or tc (defaults to the configured mode).
        #[arg(short, long)]
        mode: Option<Mode>,

        /// Output language (defaults to the configured language).
        #[arg(short, long)]
        language: Option<String>,

        /// Output file for the review (defaults to <mode>.md).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Maximum characters per document chunk.
        #[arg(long)]
        max_chunk_chars: Option<usize>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
    /// Print the config file path.
    Path,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docreview=info",
        1 => "docreview=debug",
        _ => "docreview=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Review {
            file,
            text,
            mode,
            language,
            out,
            max_chunk_chars,
        } => cmd_review(file, text, mode, language, out, max_chunk_chars).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
            ConfigAction::Path => cmd_config_path().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Review command
// ---------------------------------------------------------------------------

async fn cmd_review(
    file: Option<PathBuf>,
    text: Option<String>,
    mode: Option<Mode>,
    language: Option<String>,
    out: Option<PathBuf>,
    max_chunk_chars: Option<usize>,
) -> Result<()> {
    let config = load_config()?;

    let mode = match mode {
        Some(m) => m,
        None => config
            .defaults
            .mode
            .parse::<Mode>()
            .map_err(|e| eyre!("invalid configured mode: {e}"))?,
    };
    let language = language.unwrap_or_else(|| config.defaults.language.clone());
    let max_chars = max_chunk_chars.unwrap_or(config.defaults.max_chars_per_chunk);

    let input = match (file, text) {
        (Some(path), None) => ReviewInput::File(path),
        (None, Some(text)) => ReviewInput::Text(text),
        (None, None) => return Err(eyre!("provide a document file or --text")),
        (Some(_), Some(_)) => unreachable!("clap rejects file together with --text"),
    };

    let oracle = OpenAiOracle::from_config(&config)?;
    let service = Arc::new(ReviewService::new(Arc::new(oracle), max_chars));
    let store = RunStore::new();

    info!(mode = %mode, language = %language, max_chars, "starting review");
    let started = Instant::now();

    let run_id = start_review(
        &store,
        service,
        ReviewRequest {
            mode,
            language,
            input,
        },
    );

    // Ctrl-C requests cooperative cancellation; the run then winds down
    // at its next checkpoint instead of being killed mid-call.
    {
        let store = store.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = cancel_run(&store, run_id);
            }
        });
    }

    let progress = CliProgress::new();
    let mut seen = 0usize;

    let snapshot = loop {
        let snap = store
            .get(run_id)
            .ok_or_else(|| eyre!("run {run_id} missing from the registry"))?;
        for event in &snap.events[seen..] {
            progress.event(event.kind, &event.message);
        }
        seen = snap.events.len();

        if snap.record.status.is_terminal() {
            break snap;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    };

    progress.finish();

    match snapshot.record.status {
        RunStatus::Succeeded => {
            let result = snapshot
                .result
                .ok_or_else(|| eyre!("run succeeded but produced no review text"))?;
            let out_path = out.unwrap_or_else(|| PathBuf::from(format!("{mode}.md")));
            std::fs::write(&out_path, &result)
                .map_err(|e| eyre!("cannot write '{}': {e}", out_path.display()))?;

            println!();
            println!("  Review complete!");
            println!("  Run:      {run_id}");
            println!("  Mode:     {mode}");
            if let Some(artifact_id) = &snapshot.record.artifact_id {
                println!("  Artifact: {artifact_id}");
            }
            println!("  Output:   {}", out_path.display());
            println!("  Time:     {:.1}s", started.elapsed().as_secs_f64());
            println!();
            Ok(())
        }
        RunStatus::Canceled => Err(eyre!("review canceled")),
        RunStatus::Failed => {
            let description = snapshot
                .record
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            Err(eyre!("review failed: {description}"))
        }
        RunStatus::Running => unreachable!("loop exits only on terminal status"),
    }
}

// ---------------------------------------------------------------------------
// CLI progress rendering
// ---------------------------------------------------------------------------

/// Renders run events with an indicatif spinner: info events drive the
/// spinner message, checklist events print above it.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn event(&self, kind: EventKind, message: &str) {
        match kind {
            EventKind::Info => self.spinner.set_message(message.to_string()),
            EventKind::Todo => self.spinner.println(message),
            EventKind::Error => self.spinner.println(format!("error: {message}")),
        }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

async fn cmd_config_path() -> Result<()> {
    println!("{}", config_file_path()?.display());
    Ok(())
}
