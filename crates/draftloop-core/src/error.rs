use draftloop_critic::CritiqueError;
use draftloop_llm::BackendError;
use draftloop_logging::Step;
use thiserror::Error;

/// Failures that abort a run. Neither kind is retried.
#[derive(Error, Debug)]
pub enum LoopError {
    #[error("{step} step failed: {source}")]
    BackendInvocation { step: Step, source: BackendError },

    #[error("Precondition violated in {step} step: {message}")]
    PreconditionViolation { step: Step, message: String },
}

impl LoopError {
    pub fn writer(source: BackendError) -> Self {
        LoopError::BackendInvocation {
            step: Step::Writer,
            source,
        }
    }

    pub fn step(&self) -> Step {
        match self {
            LoopError::BackendInvocation { step, .. } => *step,
            LoopError::PreconditionViolation { step, .. } => *step,
        }
    }

    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, LoopError::PreconditionViolation { .. })
    }
}

impl From<CritiqueError> for LoopError {
    fn from(err: CritiqueError) -> Self {
        match err {
            CritiqueError::Backend(source) => LoopError::BackendInvocation {
                step: Step::Critique,
                source,
            },
            e @ CritiqueError::NoDraftToReview { .. } => LoopError::PreconditionViolation {
                step: Step::Critique,
                message: e.to_string(),
            },
        }
    }
}
