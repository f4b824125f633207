//! Best-effort summary generation.

use std::sync::Arc;

use canvass_config::AiConfig;
use canvass_core::{Response, Survey};

use crate::{prompt, AiError, GeminiClient, Summarizer};

/// Wraps an optional [`Summarizer`]. Without one, every request degrades to
/// `None`.
#[derive(Clone, Default)]
pub struct SummaryGenerator {
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl SummaryGenerator {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            summarizer: Some(summarizer),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Gemini-backed generator, or a disabled one when no key is configured.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        match GeminiClient::from_config(config)? {
            Some(client) => {
                tracing::info!(model = client.model(), "AI summaries enabled");
                Ok(Self::new(Arc::new(client)))
            }
            None => {
                tracing::warn!("GOOGLE_AI_API_KEY not configured, AI summaries disabled");
                Ok(Self::disabled())
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.summarizer.is_some()
    }

    pub async fn generate(&self, survey: &Survey, responses: &[Response]) -> Option<String> {
        let Some(summarizer) = &self.summarizer else {
            tracing::warn!(survey_id = %survey.id, "summary requested but AI is not configured");
            return None;
        };

        let prompt = prompt::build(survey, responses);
        match summarizer.summarize(&prompt).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                tracing::error!(survey_id = %survey.id, "AI returned an empty summary");
                None
            }
            Err(e) => {
                tracing::error!(survey_id = %survey.id, error = %e, "AI summary failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use canvass_core::NewSurvey;
    use serde_json::Map;
    use std::sync::Mutex;

    struct Recording {
        reply: Result<String, u16>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Summarizer for Recording {
        async fn summarize(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|status| AiError::Api {
                status,
                message: "quota exceeded".into(),
            })
        }
    }

    fn survey() -> Survey {
        Survey::new(
            NewSurvey {
                title: "Pulse".into(),
                description: None,
                questions: Vec::new(),
                json: Map::new(),
                is_active: true,
            },
            "alice",
        )
    }

    #[tokio::test]
    async fn returns_text_from_summarizer() {
        let stub = Arc::new(Recording {
            reply: Ok("Everyone is happy.".into()),
            prompts: Mutex::new(Vec::new()),
        });
        let generator = SummaryGenerator::new(stub.clone());
        let out = generator.generate(&survey(), &[]).await;
        assert_eq!(out.as_deref(), Some("Everyone is happy."));
        assert_eq!(stub.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upstream_errors_and_blank_text_become_none() {
        let failing = SummaryGenerator::new(Arc::new(Recording {
            reply: Err(429),
            prompts: Mutex::new(Vec::new()),
        }));
        assert!(failing.generate(&survey(), &[]).await.is_none());

        let blank = SummaryGenerator::new(Arc::new(Recording {
            reply: Ok("\n".into()),
            prompts: Mutex::new(Vec::new()),
        }));
        assert!(blank.generate(&survey(), &[]).await.is_none());
    }

    #[tokio::test]
    async fn disabled_generator_yields_none() {
        let generator = SummaryGenerator::from_config(&AiConfig::default()).unwrap();
        assert!(!generator.is_enabled());
        assert!(generator.generate(&survey(), &[]).await.is_none());
    }
}
