//! OpenAI provider using the Chat Completions API.
//!
//! Sends the image via data URL in the user message content array.

use super::provider::{http_failure, GeneratedPrompt, PromptRequest, VisionProvider};
use crate::credential::Credential;
use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    model: String,
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiProvider {
    /// `endpoint` is the full Chat Completions URL, so OpenAI-compatible
    /// gateways work too.
    pub fn with_endpoint(model: &str, endpoint: &str) -> Self {
        Self {
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ChatContent<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent<'a> {
    #[serde(rename = "text")]
    Text { text: &'a str },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

fn build_body<'a>(model: &'a str, request: &PromptRequest<'a>) -> ChatRequest<'a> {
    ChatRequest {
        model,
        max_tokens: request.max_output_tokens,
        temperature: request.temperature,
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ChatContent::Text {
                    text: request.instruction,
                },
                ChatContent::ImageUrl {
                    image_url: ImageUrl {
                        url: request.image.data_url(),
                    },
                },
            ],
        }],
    }
}

#[async_trait]
impl VisionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
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
        let body = build_body(&self.model, request);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::new(format!("OpenAI request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(http_failure("OpenAI", status, &text));
        }

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::new(format!("Failed to parse OpenAI response: {e}")))?;

        let text = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                GenerationError::new("OpenAI returned empty choices array, no content generated")
            })?;

        Ok(GeneratedPrompt {
            text,
            model: chat_resp.model,
            tokens_used: chat_resp.usage.map(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
