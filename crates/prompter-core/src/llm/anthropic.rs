//! Anthropic provider using the Messages API.
//!
//! Sends image + instruction with a base64 image content block.

use super::provider::{http_failure, GeneratedPrompt, PromptRequest, VisionProvider};
use crate::credential::Credential;
use crate::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Anthropic provider using the Messages API.
pub struct AnthropicProvider {
    model: String,
    client: reqwest::Client,
    endpoint: String,
}

impl AnthropicProvider {
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
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock<'a> {
    #[serde(rename = "image")]
    Image { source: ImageSource<'a> },
    #[serde(rename = "text")]
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
    model: String,
    usage: Usage,
}

#[derive(Deserialize)]
struct ResponseContent {
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

fn build_body<'a>(model: &'a str, request: &PromptRequest<'a>) -> MessagesRequest<'a> {
    MessagesRequest {
        model,
        max_tokens: request.max_output_tokens,
        temperature: request.temperature,
        messages: vec![Message {
            role: "user",
            content: vec![
                ContentBlock::Image {
                    source: ImageSource {
                        source_type: "base64",
                        media_type: request.image.media_type(),
                        data: request.image.to_base64(),
                    },
                },
                ContentBlock::Text {
                    text: request.instruction,
                },
            ],
        }],
    }
}

/// Concatenate the text blocks of a response. A response with no text block
/// is malformed.
fn extract_text(content: Vec<ResponseContent>) -> Result<String, GenerationError> {
    let texts: Vec<String> = content.into_iter().filter_map(|c| c.text).collect();
    if texts.is_empty() {
        return Err(GenerationError::new("Anthropic returned no text content"));
    }
    Ok(texts.concat())
}

#[async_trait]
impl VisionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
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
            .header("x-api-key", credential.expose())
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::new(format!("Anthropic request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(http_failure("Anthropic", status, &text));
        }

        let messages_resp: MessagesResponse = resp.json().await.map_err(|e| {
            GenerationError::new(format!("Failed to parse Anthropic response: {e}"))
        })?;

        let tokens_used = messages_resp.usage.input_tokens + messages_resp.usage.output_tokens;
        let text = extract_text(messages_resp.content)?;

        Ok(GeneratedPrompt {
            text,
            model: messages_resp.model,
            tokens_used: Some(tokens_used),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ImageInput, InputFormat};

    #[test]
    fn test_body_shape() {
        let image = ImageInput {
            bytes: vec![1, 2, 3],
            format: InputFormat::Png,
            width: 1,
            height: 1,
            file_name: None,
        };
        let request = PromptRequest {
            image: &image,
            instruction: "Describe it.",
            max_output_tokens: 512,
            temperature: 0.4,
        };
        let value = serde_json::to_value(build_body("claude-sonnet-4-20250514", &request)).unwrap();

        let content = &value["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "image/png");
        assert_eq!(content[0]["source"]["data"], "AQID");
        assert_eq!(content[1]["type"], "text");
        assert_eq!(content[1]["text"], "Describe it.");
        assert_eq!(value["max_tokens"], 512);
        assert_eq!(value["temperature"], 0.4);
    }

    #[test]
    fn test_parse_response() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "model": "claude-sonnet-4-20250514",
                "content": [{"type": "text", "text": "misty pine forest at dawn, "}, {"type": "text", "text": "volumetric light"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 1500, "output_tokens": 42}
            }"#,
        )
        .unwrap();
        assert_eq!(resp.model, "claude-sonnet-4-20250514");
        assert_eq!(resp.usage.input_tokens + resp.usage.output_tokens, 1542);
        assert_eq!(
            extract_text(resp.content).unwrap(),
            "misty pine forest at dawn, volumetric light"
        );
    }

    #[test]
    fn test_response_without_text_is_failure() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{
                "model": "claude-sonnet-4-20250514",
                "content": [],
                "stop_reason": "max_tokens",
                "usage": {"input_tokens": 1500, "output_tokens": 0}
            }"#,
        )
        .unwrap();
        let err = extract_text(resp.content).unwrap_err();
        assert_eq!(err.message, "Anthropic returned no text content");
        assert_eq!(err.status_code, None);
    }
}
