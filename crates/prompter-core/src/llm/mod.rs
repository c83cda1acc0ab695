//! Vision LLM integration.
//!
//! Provides a provider abstraction over the external multimodal services
//! (Gemini, OpenAI, Anthropic). Each provider turns one [`PromptRequest`]
//! plus a caller-supplied credential into one HTTP call.

pub(crate) mod anthropic;
pub(crate) mod gemini;
pub(crate) mod openai;
pub(crate) mod provider;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use provider::{GeneratedPrompt, PromptRequest, ProviderFactory, VisionProvider};
