use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use draftloop_critic::CritiqueStep;
use draftloop_llm::ChatBackend;
use draftloop_logging::{brief_hash, LogEvent, Logger, Step};
use draftloop_writer::{DraftLint, WriterStep};

use crate::controller::{route_after_draft, LoopState, Route, REVISION_CAP};
use crate::error::LoopError;
use crate::outcome::RunOutcome;
use crate::ConversationState;

/// Orchestrates the writer-critique loop
pub struct LoopRunner<'a> {
    writer: &'a dyn ChatBackend,
    critic: &'a dyn ChatBackend,
    logger: Arc<Logger>,
    lint: bool,
}

/// Step counts for the run in progress
#[derive(Debug, Default)]
struct Counters {
    writer_calls: usize,
    critique_calls: usize,
}

impl<'a> LoopRunner<'a> {
    pub fn new(writer: &'a dyn ChatBackend, critic: &'a dyn ChatBackend, logger: Arc<Logger>) -> Self {
        Self {
            writer,
            critic,
            logger,
            lint: false,
        }
    }

    /// Report style drift of every draft as a `DraftLint` event
    pub fn with_lint(mut self, lint: bool) -> Self {
        self.lint = lint;
        self
    }

    /// Run the loop from `state` until the revision cap is reached.
    ///
    /// Any step failure aborts the run and is returned as-is; no partial
    /// post is produced.
    pub async fn run(&self, mut state: ConversationState) -> Result<RunOutcome, LoopError> {
        let started = Instant::now();
        let brief = state.messages().first().map(|m| m.content()).unwrap_or_default();

        self.logger.log(&LogEvent::RunStarted {
            brief_hash: brief_hash(brief),
            brief_words: brief.split_whitespace().count(),
            backend: self.writer.name().to_string(),
            writer_model: self.writer.model().to_string(),
            critic_model: self.critic.model().to_string(),
            revision_cap: REVISION_CAP,
        });

        let mut counters = Counters::default();
        let mut phase = LoopState::AwaitingDraft;

        while !phase.is_terminal() {
            let result = match phase {
                LoopState::AwaitingDraft => self
                    .run_writer(&mut state, &mut counters)
                    .await
                    .map(|_| LoopState::AwaitingCritique),
                LoopState::AwaitingCritique => {
                    let route = route_after_draft(state.revisions());
                    self.logger.log(&LogEvent::RouteDecided {
                        revisions: state.revisions(),
                        route: route.to_string(),
                    });
                    match route {
                        Route::Done => Ok(LoopState::Done),
                        Route::Critique => self
                            .run_critique(&mut state, &mut counters)
                            .await
                            .map(|_| LoopState::AwaitingDraft),
                    }
                }
                LoopState::Done => Ok(LoopState::Done),
            };

            phase = match result {
                Ok(next) => next,
                Err(e) => {
                    warn!(error = %e, "Run aborted");
                    self.logger.log(&LogEvent::RunFailed {
                        step: e.step(),
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            };
        }

        let post = state
            .final_post()
            .map(str::to_string)
            .ok_or_else(|| LoopError::PreconditionViolation {
                step: Step::Writer,
                message: "run finished without a draft".to_string(),
            })?;

        let duration = started.elapsed();
        let outcome = RunOutcome::new(
            post,
            state,
            counters.writer_calls,
            counters.critique_calls,
            duration,
        );

        self.logger.log(&LogEvent::RunCompleted {
            revisions: outcome.revisions,
            writer_calls: outcome.writer_calls,
            critique_calls: outcome.critique_calls,
            words: outcome.word_count(),
            duration_secs: outcome.total_duration_secs,
        });
        info!(
            revisions = outcome.revisions,
            writer_calls = outcome.writer_calls,
            "Run completed"
        );

        Ok(outcome)
    }

    /// Draft from the full history and append it as an assistant turn
    async fn run_writer(
        &self,
        state: &mut ConversationState,
        counters: &mut Counters,
    ) -> Result<(), LoopError> {
        counters.writer_calls += 1;
        let pass = counters.writer_calls;

        self.logger.log(&LogEvent::WriterStarted {
            pass,
            revisions: state.revisions(),
        });

        debug!(pass, history_len = state.len(), "Running writer step");
        let completion = WriterStep::new(self.writer)
            .draft(state.messages())
            .await
            .map_err(LoopError::writer)?;

        let truncated = completion.truncated();
        if truncated {
            warn!(pass, model = %completion.model, "Draft stopped at the token limit");
        }
        self.logger.log(&LogEvent::WriterCompleted {
            pass,
            words: completion.word_count(),
            truncated,
            duration_secs: completion.duration.as_secs_f64(),
        });

        if self.lint {
            let lint = DraftLint::check(&completion.content);
            self.logger.log(&LogEvent::DraftLint {
                pass,
                words: lint.words,
                emojis: lint.emojis,
                warnings: lint.warnings(),
            });
        }

        state.append_draft(completion.content);
        Ok(())
    }

    /// Critique the latest draft, append the fixes as a user turn and count
    /// the revision
    async fn run_critique(
        &self,
        state: &mut ConversationState,
        counters: &mut Counters,
    ) -> Result<(), LoopError> {
        counters.critique_calls += 1;
        let revision = state.revisions() + 1;

        self.logger.log(&LogEvent::CritiqueStarted { revision });

        debug!(revision, history_len = state.len(), "Running critique step");
        let critique = CritiqueStep::new(self.critic)
            .review(state.messages())
            .await?;

        self.logger.log(&LogEvent::CritiqueCompleted {
            revision,
            bullets: critique.fixes.len(),
            conforms: critique.fixes.conforms,
            duration_secs: critique.completion.duration.as_secs_f64(),
        });

        state.append_fixes(critique.completion.content);
        Ok(())
    }
}
