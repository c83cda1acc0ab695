//! Vision provider trait and request/response types.
//!
//! Defines the interface every external vision service implements, plus the
//! factory that creates the right provider from the CLI choice and config.

use crate::config::{LlmConfig, PromptConfig, ProviderKind};
use crate::credential::Credential;
use crate::error::GenerationError;
use crate::input::ImageInput;
use crate::template::PromptTemplate;
use async_trait::async_trait;
use serde::Deserialize;

/// One multimodal request: the instruction plus the image.
///
/// Borrowed so building a request never copies the image bytes.
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
    /// The image to analyze
    pub image: &'a ImageInput,
    /// Instruction text for the model
    pub instruction: &'a str,
    /// Maximum tokens to generate
    pub max_output_tokens: u32,
    /// Sampling temperature
    pub temperature: f64,
}

impl<'a> PromptRequest<'a> {
    /// Build the request for `image` from the template and sampling settings.
    ///
    /// The instruction is the template verbatim; the image content never
    /// influences it.
    pub fn new(image: &'a ImageInput, template: &'a PromptTemplate, settings: &PromptConfig) -> Self {
        Self {
            image,
            instruction: template.as_str(),
            max_output_tokens: settings.max_output_tokens,
            temperature: settings.temperature,
        }
    }
}

/// A successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPrompt {
    /// Text returned by the service, verbatim
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all vision providers implement.
///
/// The credential is a per-call argument: providers hold only a connection
/// pool and their model settings, so one provider can serve any number of
/// sessions without their keys meeting.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// Model the provider sends requests to.
    fn model(&self) -> &str;

    /// Send one request and return the generated text.
    async fn generate(
        &self,
        request: &PromptRequest<'_>,
        credential: &Credential,
    ) -> Result<GeneratedPrompt, GenerationError>;
}

/// Common `{"error": {"message": ...}}` envelope used by all three services.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Build a failure from a non-2xx response, preferring the service's own
/// error message over the raw body.
pub(crate) fn http_failure(label: &str, status: reqwest::StatusCode, body: &str) -> GenerationError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let message = if detail.is_empty() {
        format!("{label} HTTP {status}")
    } else {
        format!("{label} HTTP {status}: {detail}")
    };
    GenerationError::with_status(message, status.as_u16())
}

/// Factory that creates the appropriate provider from the CLI choice and config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a vision provider.
    ///
    /// # Arguments
    /// * `kind` - Which service to talk to
    /// * `config` - The full LLM config section
    /// * `model_override` - Optional model name that overrides the config default
    pub fn create(
        kind: ProviderKind,
        config: &LlmConfig,
        model_override: Option<&str>,
    ) -> Box<dyn VisionProvider> {
        match kind {
            ProviderKind::Gemini => {
                let cfg = config.gemini.clone().unwrap_or_default();
                Box::new(super::gemini::GeminiProvider::from_config(
                    &cfg,
                    model_override,
                ))
            }
            ProviderKind::Openai => {
                let cfg = config.openai.clone().unwrap_or_default();
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Box::new(super::openai::OpenAiProvider::with_endpoint(
                    &model,
                    &cfg.endpoint,
                ))
            }
            ProviderKind::Anthropic => {
                let cfg = config.anthropic.clone().unwrap_or_default();
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Box::new(super::anthropic::AnthropicProvider::with_endpoint(
                    &model,
                    &cfg.endpoint,
                ))
            }
        }
    }
}
