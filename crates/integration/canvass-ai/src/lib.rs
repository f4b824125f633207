//! # Canvass AI
//!
//! Survey summaries from a generative model.
//!
//! ```text
//!   survey + responses ──> prompt::build ──> Summarizer ──> text
//!                                              │
//!                                              └── GeminiClient (generateContent)
//! ```
//!
//! [`SummaryGenerator`] is the only entry point the web layer uses. It never
//! fails: every upstream problem is logged and reported as `None`.

pub mod gemini;
pub mod generator;
pub mod prompt;

use async_trait::async_trait;

pub use gemini::GeminiClient;
pub use generator::SummaryGenerator;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI API key not configured")]
    MissingKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no text")]
    EmptyResponse,
}

/// Anything that turns a prompt into a summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, AiError>;
}
