pub mod completions;
pub mod get;

pub use completions::CompletionsCommand;
pub use get::{GetCommand, OutputFormat};
