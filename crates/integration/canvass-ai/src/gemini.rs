//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use canvass_config::AiConfig;
use serde::{Deserialize, Serialize};

use crate::{AiError, Summarizer};

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        model: &str,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        if api_key.trim().is_empty() {
            return Err(AiError::MissingKey);
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Build from config. `Ok(None)` when no API key is configured.
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>, AiError> {
        match config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(key) => Self::new(
                key,
                &config.model,
                &config.endpoint,
                Duration::from_secs(config.timeout_secs),
            )
            .map(Some),
            None => Ok(None),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(body: ApiResponse) -> Option<String> {
    let content = body.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, prompt: &str) -> Result<String, AiError> {
        let request = ApiRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ApiResponse = response.json().await?;
        extract_text(body).ok_or(AiError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ApiResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn joins_parts_of_first_candidate() {
        let body = parse(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"Most "},{"text":"liked it."}],"role":"model"}},
                {"content":{"parts":[{"text":"ignored"}]}}
            ]}"#,
        );
        assert_eq!(extract_text(body).as_deref(), Some("Most liked it."));
    }

    #[test]
    fn blocked_or_empty_output_is_none() {
        assert!(extract_text(parse(r#"{"candidates":[]}"#)).is_none());
        assert!(extract_text(parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)).is_none());
        let blank = r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#;
        assert!(extract_text(parse(blank)).is_none());
    }

    #[test]
    fn request_body_shape() {
        let request = ApiRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn url_targets_model() {
        let client = GeminiClient::new(
            "key",
            "gemini-2.0-flash",
            "https://example.test/v1beta/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.url(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn no_key_means_no_client() {
        assert!(GeminiClient::from_config(&AiConfig::default()).unwrap().is_none());
        assert!(matches!(
            GeminiClient::new(" ", "m", "e", Duration::from_secs(1)),
            Err(AiError::MissingKey)
        ));
    }
}
