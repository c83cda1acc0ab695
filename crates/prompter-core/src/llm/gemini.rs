//! Google Gemini provider using the generateContent API.
//!
//! Sends the instruction and the image as two parts of one user turn, with
//! the image inlined as base64.

use super::provider::{http_failure, GeneratedPrompt, PromptRequest, VisionProvider};
use crate::config::GeminiConfig;
use crate::credential::Credential;
use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Gemini provider.
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    thinking_budget: Option<i32>,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// `endpoint` is the API base, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    ///
    /// No thinking budget is sent; the model's own default applies.
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            thinking_budget: None,
            client: reqwest::Client::new(),
        }
    }

    /// Build from the `[llm.gemini]` config section.
    pub fn from_config(config: &GeminiConfig, model_override: Option<&str>) -> Self {
        let model = model_override.unwrap_or(&config.model);
        Self::new(&config.endpoint, model).with_thinking_budget(Some(config.thinking_budget))
    }

    pub fn with_thinking_budget(mut self, budget: Option<i32>) -> Self {
        self.thinking_budget = budget;
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData<'a>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: i32,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

fn build_body<'a>(
    request: &PromptRequest<'a>,
    thinking_budget: Option<i32>,
) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::Text(request.instruction),
                Part::InlineData(InlineData {
                    mime_type: request.image.media_type(),
                    data: request.image.to_base64(),
                }),
            ],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: request.max_output_tokens,
            temperature: request.temperature,
            thinking_config: thinking_budget.map(|thinking_budget| ThinkingConfig { thinking_budget }),
        },
    }
}

/// Pull the text out of the first candidate.
///
/// Text parts are concatenated as-is. A response without candidates, or
/// whose candidate carries no text part, is malformed.
fn extract_text(resp: GenerateContentResponse) -> Result<String, GenerationError> {
    let Some(candidate) = resp.candidates.into_iter().next() else {
        let reason = resp
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!(" (blocked: {r})"))
            .unwrap_or_default();
        return Err(GenerationError::new(format!(
            "Gemini returned no candidates{reason}"
        )));
    };

    let texts: Vec<String> = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if texts.is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!(" (finish reason: {r})"))
            .unwrap_or_default();
        return Err(GenerationError::new(format!(
            "Gemini returned no text content{reason}"
        )));
    }

    Ok(texts.concat())
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &PromptRequest<'_>,
        credential: &Credential,
    ) -> Result<GeneratedPrompt, GenerationError> {
        let start = Instant::now();
        let body = build_body(request, self.thinking_budget);

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::new(format!("Gemini request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(http_failure("Gemini", status, &text));
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::new(format!("Failed to parse Gemini response: {e}")))?;

        let tokens_used = parsed
            .usage_metadata
            .as_ref()
            .and_then(|u| u.total_token_count);
        let model = parsed
            .model_version
            .clone()
            .unwrap_or_else(|| self.model.clone());
        let text = extract_text(parsed)?;

        Ok(GeneratedPrompt {
            text,
            model,
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptConfig;
    use crate::input::{ImageInput, InputFormat};
    use crate::template::PromptTemplate;

    fn png() -> ImageInput {
        ImageInput {
            bytes: vec![1, 2, 3],
            format: InputFormat::Png,
            width: 1,
            height: 1,
            file_name: None,
        }
    }

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_url() {
        let provider = GeminiProvider::new("https://example.test/v1beta/", "gemini-2.5-flash");
        assert_eq!(
            provider.url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_body_shape() {
        let image = png();
        let request = PromptRequest {
            image: &image,
            instruction: "Describe it.",
            max_output_tokens: 256,
            temperature: 0.5,
        };
        let value = serde_json::to_value(build_body(&request, None)).unwrap();

        let parts = &value["contents"][0]["parts"];
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(parts[0]["text"], "Describe it.");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "AQID");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 256);
        assert_eq!(value["generationConfig"]["temperature"], 0.5);
        assert!(value["generationConfig"].get("thinkingConfig").is_none());
    }

    #[test]
    fn test_default_config_body_leaves_room_for_the_answer() {
        let provider = GeminiProvider::from_config(&GeminiConfig::default(), None);
        assert_eq!(provider.model(), "gemini-2.5-flash");

        let image = png();
        let template = PromptTemplate::default();
        let settings = PromptConfig::default();
        let request = PromptRequest::new(&image, &template, &settings);
        let value = serde_json::to_value(build_body(&request, provider.thinking_budget)).unwrap();

        let generation = &value["generationConfig"];
        assert_eq!(generation["thinkingConfig"]["thinkingBudget"], 0);
        assert_eq!(generation["maxOutputTokens"], 1024);
        assert_eq!(generation["temperature"], 0.4);
    }

    #[test]
    fn test_from_config_honors_override_and_budget() {
        let config = GeminiConfig {
            thinking_budget: -1,
            ..GeminiConfig::default()
        };
        let provider = GeminiProvider::from_config(&config, Some("gemini-2.5-flash-lite"));
        assert_eq!(provider.model(), "gemini-2.5-flash-lite");
        assert_eq!(provider.thinking_budget, Some(-1));
    }

    #[test]
    fn test_extract_text_verbatim() {
        let resp = parse(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [
                        {"text": "A red apple on a wooden table, "},
                        {"text": "photorealistic, soft lighting, 8k"}
                    ]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"totalTokenCount": 321},
                "modelVersion": "gemini-2.5-flash"
            }"#,
        );
        assert_eq!(
            extract_text(resp).unwrap(),
            "A red apple on a wooden table, photorealistic, soft lighting, 8k"
        );
    }

    #[test]
    fn test_extract_text_keeps_whitespace() {
        let resp = parse(r#"{"candidates": [{"content": {"parts": [{"text": "  spaced\n"}]}}]}"#);
        assert_eq!(extract_text(resp).unwrap(), "  spaced\n");
    }

    #[test]
    fn test_blocked_prompt_is_failure() {
        let resp = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        let err = extract_text(resp).unwrap_err();
        assert_eq!(err.message, "Gemini returned no candidates (blocked: SAFETY)");
    }

    #[test]
    fn test_candidate_without_text_is_failure() {
        let resp = parse(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#);
        let err = extract_text(resp).unwrap_err();
        assert!(err.message.contains("MAX_TOKENS"));
    }
}
