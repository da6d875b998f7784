mod completion;
mod message;
mod openai;
#[cfg(feature = "test-support")]
mod scripted;
mod traits;

pub use completion::Completion;
pub use message::{latest_assistant, Message, Role};
pub use openai::OpenAiCompatibleBackend;
#[cfg(feature = "test-support")]
pub use scripted::ScriptedBackend;
pub use traits::{BackendConfig, BackendError, BackendType, ChatBackend};

/// Create a backend by type
pub fn create_backend(
    backend_type: BackendType,
    config: BackendConfig,
) -> Result<Box<dyn ChatBackend>, BackendError> {
    let backend = OpenAiCompatibleBackend::new(backend_type, config)?;
    Ok(Box::new(backend))
}
