// ABOUTME: LLM provider adapters implementing the ModelRuntime trait.
// ABOUTME: Each adapter translates one prompt pair into its provider's completion API.

pub mod gemini;
pub mod openai;

pub use gemini::GeminiRuntime;
pub use openai::OpenAIRuntime;
