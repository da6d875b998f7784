mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;

use draftloop_core::{ConversationState, LoopRunner, RunOutcome, REVISION_CAP};
use draftloop_llm::{create_backend, BackendConfig, BackendType, ChatBackend};
use draftloop_logging::{default_log_path, init_tracing, LogFormat, Logger};

use config::ProjectConfig;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Parser, Debug)]
#[command(
    name = "draftloop",
    about = "Draft a short social post, then critique and revise it",
    version,
    author
)]
struct Cli {
    /// Post brief (or reads from brief.md if not provided)
    #[arg(short, long)]
    brief: Option<String>,

    /// Path to brief file (default: ./brief.md)
    #[arg(long, default_value = "brief.md")]
    brief_file: PathBuf,

    /// Path to config file (default: ./draftloop.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chat completion backend
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Model for both steps
    #[arg(short, long)]
    model: Option<String>,

    /// Model for the writer step
    #[arg(long)]
    writer_model: Option<String>,

    /// Model for the critique step
    #[arg(long)]
    critic_model: Option<String>,

    /// Override the backend's API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Cap on tokens generated per completion
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Tracing level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Write the event log here instead of the data directory
    #[arg(long, conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Do not write an event log file
    #[arg(long)]
    no_log_file: bool,

    /// Report length, emojis, hook and call to action for every draft
    #[arg(long)]
    lint: bool,

    /// Output final result as JSON
    #[arg(long)]
    json_output: bool,

    /// Dry run: show the resolved settings without calling a backend
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendChoice {
    Groq,
    Openai,
    Ollama,
}

impl From<BackendChoice> for BackendType {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Groq => BackendType::Groq,
            BackendChoice::Openai => BackendType::OpenAi,
            BackendChoice::Ollama => BackendType::Ollama,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

/// Backend settings after merging CLI flags, config file and defaults
#[derive(Debug, PartialEq)]
struct Settings {
    backend: BackendType,
    writer_model: String,
    critic_model: String,
    base_url: Option<String>,
    timeout: Duration,
    max_tokens: Option<u32>,
}

impl Settings {
    /// Priority: CLI flag > config role table > config global > backend default
    fn resolve(cli: &Cli, config: &ProjectConfig) -> Result<Self> {
        let backend = match cli.backend {
            Some(choice) => choice.into(),
            None => config.backend_type()?.unwrap_or_default(),
        };

        let writer_model = cli
            .writer_model
            .as_deref()
            .or(cli.model.as_deref())
            .or(config.writer_model())
            .unwrap_or(backend.default_model())
            .to_string();
        let critic_model = cli
            .critic_model
            .as_deref()
            .or(cli.model.as_deref())
            .or(config.critic_model())
            .unwrap_or(backend.default_model())
            .to_string();

        // A zero timeout would fail every request before it is sent
        let timeout_secs = cli
            .timeout_secs
            .or(config.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }

        let max_tokens = cli.max_tokens.or(config.max_tokens);
        if max_tokens == Some(0) {
            anyhow::bail!("max_tokens must be at least 1");
        }

        Ok(Self {
            backend,
            writer_model,
            critic_model,
            base_url: cli.base_url.clone().or_else(|| config.base_url.clone()),
            timeout: Duration::from_secs(timeout_secs),
            max_tokens,
        })
    }

    fn backend_config(&self, model: &str) -> BackendConfig {
        let mut config = BackendConfig::default()
            .with_model(model.to_string())
            .with_timeout(self.timeout);
        if let Some(ref url) = self.base_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        config
    }
}

/// Backend clients for one run. One client per distinct model: the critic
/// gets its own only when its model differs from the writer's.
struct Backends {
    writer: Box<dyn ChatBackend>,
    critic: Option<Box<dyn ChatBackend>>,
}

impl Backends {
    fn build(settings: &Settings) -> Result<Self> {
        let writer = create_backend(
            settings.backend,
            settings.backend_config(&settings.writer_model),
        )
        .context("Failed to create writer backend")?;

        let critic = if settings.critic_model != settings.writer_model {
            let backend = create_backend(
                settings.backend,
                settings.backend_config(&settings.critic_model),
            )
            .context("Failed to create critic backend")?;
            Some(backend)
        } else {
            None
        };

        Ok(Self { writer, critic })
    }

    fn writer(&self) -> &dyn ChatBackend {
        self.writer.as_ref()
    }

    fn critic(&self) -> &dyn ChatBackend {
        self.critic.as_deref().unwrap_or(self.writer.as_ref())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;

    let project_config = match cli.config {
        Some(ref path) => ProjectConfig::load_from(path)?,
        None => ProjectConfig::load(&working_dir)?.unwrap_or_default(),
    };

    let brief = get_brief(&cli, &working_dir)?;
    let settings = Settings::resolve(&cli, &project_config)?;

    if cli.dry_run {
        println!("=== Dry Run ===");
        println!("Brief: {}", preview(&brief, 100));
        println!("Backend: {}", settings.backend);
        println!(
            "Base URL: {}",
            settings
                .base_url
                .as_deref()
                .unwrap_or(settings.backend.default_base_url())
        );
        println!("Writer model: {}", settings.writer_model);
        println!("Critic model: {}", settings.critic_model);
        println!("Timeout: {}s", settings.timeout.as_secs());
        if let Some(max_tokens) = settings.max_tokens {
            println!("Max tokens: {}", max_tokens);
        }
        println!("Revision cap: {}", REVISION_CAP);
        return Ok(());
    }

    let backends = Backends::build(&settings)?;

    let logger = Arc::new(create_logger(&cli, log_format, &brief));
    let runner =
        LoopRunner::new(backends.writer(), backends.critic(), logger).with_lint(cli.lint);

    let outcome = match runner.run(ConversationState::new(brief)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "=== FAILED ===".bright_red());
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if cli.json_output {
        let json = serde_json::to_string_pretty(&outcome)?;
        println!("{}", json);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn get_brief(cli: &Cli, working_dir: &Path) -> Result<String> {
    // Prefer --brief flag
    if let Some(ref brief) = cli.brief {
        return non_empty_brief(brief.trim().to_string());
    }

    let brief_path = if cli.brief_file.is_absolute() {
        cli.brief_file.clone()
    } else {
        working_dir.join(&cli.brief_file)
    };

    if brief_path.exists() {
        let content = std::fs::read_to_string(&brief_path).context("Failed to read brief file")?;
        non_empty_brief(content.trim().to_string())
    } else {
        anyhow::bail!(
            "No brief provided. Use --brief or create a {} file",
            cli.brief_file.display()
        )
    }
}

fn non_empty_brief(brief: String) -> Result<String> {
    if brief.is_empty() {
        anyhow::bail!("The brief is empty");
    }
    Ok(brief)
}

fn create_logger(cli: &Cli, format: LogFormat, brief: &str) -> Logger {
    if cli.no_log_file {
        return Logger::new(format);
    }

    let path = match cli.log_file {
        Some(ref path) => Ok(path.clone()),
        None => default_log_path(brief),
    };

    match path.and_then(|p| Logger::with_file(format, &p).map(|l| (l, p))) {
        Ok((logger, path)) => {
            tracing::debug!(path = %path.display(), "Writing event log");
            logger
        }
        Err(e) => {
            tracing::warn!(error = %e, "Event log file unavailable, logging to console only");
            Logger::new(format)
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn print_outcome(outcome: &RunOutcome) {
    eprintln!();
    eprintln!("{}", "=== DONE ===".bright_green());
    eprintln!(
        "Revisions: {} ({} drafts, {} critiques)",
        outcome.revisions, outcome.writer_calls, outcome.critique_calls
    );
    eprintln!("Words: {}", outcome.word_count());
    eprintln!("Duration: {:.1}s", outcome.total_duration_secs);
    eprintln!();

    // The post itself goes to stdout so it can be piped
    println!("{}", outcome.post);
}
