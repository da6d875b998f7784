use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

/// Loop step producing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Writer,
    Critique,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Writer => write!(f, "writer"),
            Step::Critique => write!(f, "critique"),
        }
    }
}

/// Structured log events for the writer-critique loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    /// The brief itself stays out of the log; `brief_hash` matches the log
    /// file name
    RunStarted {
        brief_hash: String,
        brief_words: usize,
        backend: String,
        writer_model: String,
        critic_model: String,
        revision_cap: u32,
    },
    /// `pass` counts writer invocations from 1
    WriterStarted {
        pass: usize,
        revisions: u32,
    },
    /// `truncated` is set when the backend stopped at its token limit
    WriterCompleted {
        pass: usize,
        words: usize,
        truncated: bool,
        duration_secs: f64,
    },
    /// Post-hoc style check of a draft; informational only
    DraftLint {
        pass: usize,
        words: usize,
        emojis: usize,
        warnings: Vec<String>,
    },
    CritiqueStarted {
        revision: u32,
    },
    CritiqueCompleted {
        revision: u32,
        bullets: usize,
        conforms: bool,
        duration_secs: f64,
    },
    RouteDecided {
        revisions: u32,
        route: String,
    },
    RunCompleted {
        revisions: u32,
        writer_calls: usize,
        critique_calls: usize,
        words: usize,
        duration_secs: f64,
    },
    RunFailed {
        step: Step,
        error: String,
    },
}

impl LogEvent {
    /// Serialize with a timestamp and the run id attached
    fn with_envelope(&self, run_id: &Uuid) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
            obj.insert(
                "run_id".to_string(),
                serde_json::Value::String(run_id.to_string()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

/// Logger for draftloop events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    run_id: Uuid,
    quiet: bool,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            run_id: Uuid::new_v4(),
            quiet: false,
            file_writer: None,
        }
    }

    /// Logger that writes nothing to the console
    pub fn silent() -> Self {
        Self::new(LogFormat::Compact).quiet()
    }

    /// Turn console output off, keeping the file sink if there is one
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            file_writer: Some(Mutex::new(file)),
            ..Self::new(format)
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_envelope(&self.run_id);
                let _ = writeln!(file, "{}", json);
            }
        }

        if self.quiet {
            return;
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        let _ = writeln!(std::io::stderr(), "{}", event.with_envelope(&self.run_id));
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::RunStarted {
                brief_hash,
                brief_words,
                backend,
                writer_model,
                critic_model,
                revision_cap,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "draftloop".bold().bright_white(),
                    " ".repeat(58) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Brief:".dimmed(),
                    Self::truncate_with_padding(
                        &format!("{} ({} words)", brief_hash, brief_words),
                        60,
                        68
                    )
                    .dimmed()
                );
                let models = if writer_model == critic_model {
                    format!("{} ({})", backend, writer_model)
                } else {
                    format!("{} (writer {}, critic {})", backend, writer_model, critic_model)
                };
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Model:".dimmed(),
                    Self::truncate_with_padding(&models, 60, 68).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Cap:".dimmed(),
                    Self::truncate_with_padding(&format!("{} revisions", revision_cap), 62, 68)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::WriterStarted { pass, revisions } => {
                let header = if *revisions == 0 {
                    format!("─ Draft {} ", pass)
                } else {
                    format!("─ Draft {} (revision {}) ", pass, revisions)
                };
                let padding = "─".repeat(67usize.saturating_sub(header.chars().count()));
                let _ = writeln!(
                    stderr,
                    "{}{}{}",
                    "┌".bright_blue(),
                    header.bright_blue().bold(),
                    padding.bright_blue()
                );
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_cyan(),
                    "WRITER".bright_cyan().bold()
                );
            }
            LogEvent::WriterCompleted {
                words,
                truncated,
                duration_secs,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} words ({:.1}s)",
                    "✓".bright_green(),
                    words,
                    duration_secs
                );
                if *truncated {
                    let _ = writeln!(
                        stderr,
                        "    {} {}",
                        "⚠".bright_yellow(),
                        "Draft was cut off at the token limit".yellow()
                    );
                }
                let _ = writeln!(stderr);
            }
            LogEvent::DraftLint {
                words,
                emojis,
                warnings,
                ..
            } => {
                if warnings.is_empty() {
                    let _ = writeln!(
                        stderr,
                        "    {} {}",
                        "✎".dimmed(),
                        format!("Lint: ok ({} words, {} emojis)", words, emojis).dimmed()
                    );
                } else {
                    for warning in warnings {
                        let _ = writeln!(
                            stderr,
                            "    {} {}",
                            "⚠".bright_yellow(),
                            warning.yellow()
                        );
                    }
                }
                let _ = writeln!(stderr);
            }
            LogEvent::CritiqueStarted { .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_magenta(),
                    "CRITIQUE".bright_magenta().bold()
                );
            }
            LogEvent::CritiqueCompleted {
                bullets,
                conforms,
                duration_secs,
                ..
            } => {
                let line = format!("→ {} fixes ({:.1}s)", bullets, duration_secs);
                let _ = writeln!(stderr, "    {}", line.bright_yellow());
                if !conforms {
                    let _ = writeln!(
                        stderr,
                        "    {} {}",
                        "⚠".bright_yellow(),
                        "Critique did not open with the revise directive".yellow()
                    );
                }
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "└─────────────────────────────────────────────────────────────────────┘"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::RouteDecided { .. } => {
                // Visible through the step headers
            }
            LogEvent::RunCompleted { .. } => {
                // Printed with the final post in main.rs
            }
            LogEvent::RunFailed { step, error } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} {} step failed: {}",
                    "✗".bright_red(),
                    step,
                    error.bright_red()
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::RunStarted {
                brief_hash,
                revision_cap,
                ..
            } => format!(
                "[{}] run:start brief={} cap={}",
                timestamp, brief_hash, revision_cap
            ),
            LogEvent::WriterStarted { pass, revisions } => {
                format!("[{}] writer:start:{} rev={}", timestamp, pass, revisions)
            }
            LogEvent::WriterCompleted {
                pass,
                words,
                truncated,
                duration_secs,
            } => format!(
                "[{}] writer:done:{} {}w {:.1}s{}",
                timestamp,
                pass,
                words,
                duration_secs,
                if *truncated { " truncated" } else { "" }
            ),
            LogEvent::DraftLint { pass, warnings, .. } => {
                format!("[{}] lint:{} warnings={}", timestamp, pass, warnings.len())
            }
            LogEvent::CritiqueStarted { revision } => {
                format!("[{}] critique:start:{}", timestamp, revision)
            }
            LogEvent::CritiqueCompleted {
                revision,
                bullets,
                conforms,
                duration_secs,
            } => format!(
                "[{}] critique:done:{} fixes={} conforms={} {:.1}s",
                timestamp, revision, bullets, conforms, duration_secs
            ),
            LogEvent::RouteDecided { revisions, route } => {
                format!("[{}] route:{} rev={}", timestamp, route, revisions)
            }
            LogEvent::RunCompleted {
                revisions,
                duration_secs,
                ..
            } => format!(
                "[{}] run:done rev={} {:.1}s",
                timestamp, revisions, duration_secs
            ),
            LogEvent::RunFailed { step, error } => {
                format!("[{}] error:{}:{}", timestamp, step, error)
            }
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let first_line = s.lines().next().unwrap_or_default();
        let truncated = if first_line.chars().count() > max_len {
            let head: String = first_line.chars().take(max_len - 3).collect();
            format!("{}...", head)
        } else {
            first_line.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1);
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}
