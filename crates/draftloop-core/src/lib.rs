mod controller;
mod error;
mod loop_runner;
mod outcome;
mod state;

pub use controller::{route_after_draft, LoopState, Route, REVISION_CAP};
pub use error::LoopError;
pub use loop_runner::LoopRunner;
pub use outcome::RunOutcome;
pub use state::ConversationState;
