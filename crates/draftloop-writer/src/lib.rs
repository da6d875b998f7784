pub mod lint;
mod prompts;
mod writer;

pub use lint::DraftLint;
pub use prompts::WriterPrompts;
pub use writer::WriterStep;
