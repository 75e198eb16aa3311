//! Gemini API client (generateContent, non-streaming).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("gemini request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("gemini api error: {0}")]
    Api(String),
    #[error("gemini returned no text{}", blocked_suffix(.0))]
    EmptyResponse(Option<String>),
}

fn blocked_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" (blocked: {})", r))
        .unwrap_or_default()
}

/// Turns a prompt into generated text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Client for the Generative Language API.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = model
            .map(|m| m.trim().trim_start_matches("models/").to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self {
            base_url,
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// POST /v1beta/models/{model}:generateContent with a single user turn.
    pub async fn generate_content(
        &self,
        prompt: &str,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };
        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!("{} {}", status, body)));
        }
        let data: GenerateContentResponse = res.json().await?;
        Ok(data)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self.generate_content(prompt).await?;
        match response.text() {
            Some(text) => Ok(text),
            None => Err(GenerationError::EmptyResponse(response.block_reason())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate; None when there is no text at all.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let mut out = String::new();
        let mut any = false;
        for text in parts.iter().filter_map(|p| p.text.as_deref()) {
            out.push_str(text);
            any = true;
        }
        any.then_some(out)
    }

    /// Why the prompt was blocked, or the first candidate's finish reason if it produced no text.
    pub fn block_reason(&self) -> Option<String> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| self.candidates.first().and_then(|c| c.finish_reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_format() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part {
                    text: Some("who are you?".into()),
                }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents":[{"role":"user","parts":[{"text":"who are you?"}]}]})
        );
    }

    #[test]
    fn text_joins_parts_of_first_candidate() {
        let r: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"content":{"role":"model","parts":[{"text":"I am "},{"text":"Gemini."}]},"finishReason":"STOP"},
                    {"content":{"role":"model","parts":[{"text":"ignored"}]}}
                ],
                "usageMetadata": {"promptTokenCount": 4}
            }"#,
        )
        .unwrap();
        assert_eq!(r.text().as_deref(), Some("I am Gemini."));
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let r: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(r.text(), None);
        assert_eq!(r.block_reason().as_deref(), Some("SAFETY"));
        let err = GenerationError::EmptyResponse(r.block_reason());
        assert_eq!(err.to_string(), "gemini returned no text (blocked: SAFETY)");
    }

    #[test]
    fn model_prefix_and_defaults() {
        let c = GeminiClient::new("k".into(), Some("models/gemini-1.5-pro".into()), None);
        assert_eq!(c.model(), "gemini-1.5-pro");
        let c = GeminiClient::new("k".into(), Some("  ".into()), Some("http://x/".into()));
        assert_eq!(c.model(), DEFAULT_MODEL);
        assert_eq!(c.base_url, "http://x");
    }
}
