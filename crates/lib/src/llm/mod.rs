//! Text generation abstraction and Gemini client.

mod gemini;

pub use gemini::{GeminiClient, GenerationError, Generator};
