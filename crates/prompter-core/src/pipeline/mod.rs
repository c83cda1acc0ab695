//! The prompt-generation pipeline.
//!
//! One operation: image + credential in, one prompt (or one failure) out.
//! The pipeline is immutable after construction and can be shared by any
//! number of concurrent sessions; everything user-specific arrives as a call
//! argument.

mod session;

pub use session::{GenerationState, MissingInput, Session};

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, PromptConfig};
use crate::credential::Credential;
use crate::error::GenerationError;
use crate::input::ImageInput;
use crate::llm::{GeneratedPrompt, PromptRequest, ProviderFactory, VisionProvider};
use crate::template::PromptTemplate;

/// Tagged result of one generation attempt.
pub type GenerationOutcome = Result<GeneratedPrompt, GenerationError>;

/// Turns an image into a text-to-image prompt with a single provider call.
pub struct PromptPipeline {
    provider: Arc<dyn VisionProvider>,
    template: PromptTemplate,
    settings: PromptConfig,
    request_timeout: Duration,
}

impl PromptPipeline {
    pub fn new(
        provider: Box<dyn VisionProvider>,
        template: PromptTemplate,
        settings: PromptConfig,
        request_timeout: Duration,
    ) -> Self {
        Self {
            provider: Arc::from(provider),
            template,
            settings,
            request_timeout,
        }
    }

    /// Build a pipeline for the configured default provider.
    pub fn from_config(config: &Config) -> Self {
        let provider = ProviderFactory::create(config.llm.provider, &config.llm, None);
        Self::with_provider(provider, config)
    }

    /// Build a pipeline around an explicit provider, taking template and
    /// limits from `config`.
    pub fn with_provider(provider: Box<dyn VisionProvider>, config: &Config) -> Self {
        Self::new(
            provider,
            config.template(),
            config.prompt.clone(),
            Duration::from_millis(config.limits.request_timeout_ms),
        )
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// Generate a prompt for `image`, authenticating with `credential`.
    ///
    /// Issues exactly one request. Every failure (transport, authentication,
    /// service error, malformed response, timeout) comes back as
    /// `Err(GenerationError)`; nothing is retried.
    pub async fn generate_prompt(
        &self,
        image: &ImageInput,
        credential: &Credential,
    ) -> GenerationOutcome {
        let request = PromptRequest::new(image, &self.template, &self.settings);

        tracing::debug!(
            provider = self.provider.name(),
            model = self.provider.model(),
            image_format = %image.format,
            width = image.width,
            height = image.height,
            "Requesting prompt"
        );

        let outcome = match tokio::time::timeout(
            self.request_timeout,
            self.provider.generate(&request, credential),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GenerationError::new(format!(
                "{} request timed out after {}ms",
                self.provider.name(),
                self.request_timeout.as_millis()
            ))),
        };

        match &outcome {
            Ok(prompt) => tracing::info!(
                model = %prompt.model,
                latency_ms = prompt.latency_ms,
                tokens = ?prompt.tokens_used,
                "Prompt generated"
            ),
            Err(e) => tracing::warn!(status = ?e.status_code, "Prompt generation failed: {e}"),
        }

        outcome
    }
}

/// Text shown to the user for an outcome: the prompt itself, or
/// `"Error: <details>"`.
pub fn display_text(outcome: &GenerationOutcome) -> String {
    match outcome {
        Ok(prompt) => prompt.text.clone(),
        Err(e) => e.display_text(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Mock provider shared by pipeline and session tests.

    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Observed inputs of one `generate` call.
    #[derive(Debug, Clone)]
    pub struct SeenRequest {
        pub instruction: String,
        pub credential: String,
        pub image_len: usize,
    }

    /// A configurable mock provider.
    ///
    /// Each call invokes the response factory with the current request and
    /// credential, so tests can echo inputs back or fail on specific keys.
    pub struct MockProvider {
        response_fn: Box<
            dyn Fn(&PromptRequest<'_>, &Credential) -> Result<String, GenerationError> + Send + Sync,
        >,
        pub call_count: Arc<AtomicU32>,
        pub seen: Arc<Mutex<Vec<SeenRequest>>>,
        delay: Option<Duration>,
    }

    impl MockProvider {
        pub fn new<F>(response_fn: F) -> Self
        where
            F: Fn(&PromptRequest<'_>, &Credential) -> Result<String, GenerationError>
                + Send
                + Sync
                + 'static,
        {
            Self {
                response_fn: Box::new(response_fn),
                call_count: Arc::new(AtomicU32::new(0)),
                seen: Arc::new(Mutex::new(Vec::new())),
                delay: None,
            }
        }

        pub fn success(text: &str) -> Self {
            let text = text.to_string();
            Self::new(move |_, _| Ok(text.clone()))
        }

        pub fn failing(status_code: Option<u16>, message: &str) -> Self {
            let message = message.to_string();
            Self::new(move |_, _| {
                Err(GenerationError {
                    message: message.clone(),
                    status_code,
                })
            })
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl VisionProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-v1"
        }

        async fn generate(
            &self,
            request: &PromptRequest<'_>,
            credential: &Credential,
        ) -> Result<GeneratedPrompt, GenerationError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(SeenRequest {
                instruction: request.instruction.to_string(),
                credential: credential.expose().to_string(),
                image_len: request.image.bytes.len(),
            });
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let text = (self.response_fn)(request, credential)?;
            Ok(GeneratedPrompt {
                text,
                model: "mock-v1".to_string(),
                tokens_used: Some(42),
                latency_ms: 10,
            })
        }
    }

    pub fn jpeg(len: usize) -> ImageInput {
        let mut bytes = vec![0xFF, 0xD8, 0xFF];
        bytes.resize(len.max(3), 0);
        ImageInput {
            bytes,
            format: crate::input::InputFormat::Jpeg,
            width: 500,
            height: 500,
            file_name: Some("apple.jpg".to_string()),
        }
    }

    pub fn pipeline(provider: MockProvider) -> PromptPipeline {
        PromptPipeline::with_provider(Box::new(provider), &Config::default())
    }
}
