pub mod evaluator;
mod fixes;
mod prompts;

pub use evaluator::{Critique, CritiqueError, CritiqueStep};
pub use fixes::FixesList;
pub use prompts::{CriticPrompts, REVISE_DIRECTIVE};
