//! CLI enum types for the generate command: output format and provider.

use clap::ValueEnum;
use prompter_core::{GeneratedPrompt, ImageInput, ProviderKind};
use serde::Serialize;

/// How the generated prompt is written out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The prompt text alone, ready to paste (default)
    #[default]
    Text,
    /// A JSON object with the prompt plus model and timing details
    Json,
}

/// Vision services selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    /// Google Gemini
    Gemini,
    /// OpenAI
    Openai,
    /// Anthropic
    Anthropic,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Gemini => ProviderKind::Gemini,
            ProviderArg::Openai => ProviderKind::Openai,
            ProviderArg::Anthropic => ProviderKind::Anthropic,
        }
    }
}

/// JSON shape written by `--format json`.
#[derive(Debug, Serialize)]
pub struct PromptRecord<'a> {
    pub file: Option<&'a str>,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub provider: &'a str,
    pub model: &'a str,
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    pub latency_ms: u64,
}

impl<'a> PromptRecord<'a> {
    pub fn new(image: &'a ImageInput, provider: &'a str, prompt: &'a GeneratedPrompt) -> Self {
        Self {
            file: image.file_name.as_deref(),
            format: image.format.to_string(),
            width: image.width,
            height: image.height,
            provider,
            model: &prompt.model,
            prompt: &prompt.text,
            tokens_used: prompt.tokens_used,
            latency_ms: prompt.latency_ms,
        }
    }
}
