//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

use crate::template::DEFAULT_TEMPLATE;

/// Which external vision service answers prompt requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini (generateContent API)
    #[default]
    Gemini,
    /// OpenAI Chat Completions
    Openai,
    /// Anthropic Messages API
    Anthropic,
}

impl ProviderKind {
    /// Human-readable label for a provider.
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::Openai => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Openai => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::Openai),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            other => Err(format!("Unknown provider: {other}")),
        }
    }
}

/// Instruction template and sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Instruction text sent alongside every image
    pub template: String,

    /// Upper bound on generated tokens
    pub max_output_tokens: u32,

    /// Sampling temperature
    pub temperature: f64,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            max_output_tokens: 1024,
            temperature: 0.4,
        }
    }
}

/// Resource limits for user-supplied images and the service call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Timeout for the single generation request in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            request_timeout_ms: 60000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Vision provider configurations.
///
/// API keys never live here. Each provider only names the environment
/// variable the front end may read a key from.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider used when none is given on the command line
    pub provider: ProviderKind,

    /// Google Gemini configuration
    pub gemini: Option<GeminiConfig>,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,

    /// Anthropic configuration
    pub anthropic: Option<AnthropicConfig>,
}

impl LlmConfig {
    /// Environment variable holding the API key for `provider`.
    pub fn api_key_env(&self, provider: ProviderKind) -> String {
        match provider {
            ProviderKind::Gemini => self.gemini.clone().unwrap_or_default().api_key_env,
            ProviderKind::Openai => self.openai.clone().unwrap_or_default().api_key_env,
            ProviderKind::Anthropic => self.anthropic.clone().unwrap_or_default().api_key_env,
        }
    }

    /// Configured model for `provider`.
    pub fn model(&self, provider: ProviderKind) -> String {
        match provider {
            ProviderKind::Gemini => self.gemini.clone().unwrap_or_default().model,
            ProviderKind::Openai => self.openai.clone().unwrap_or_default().model,
            ProviderKind::Anthropic => self.anthropic.clone().unwrap_or_default().model,
        }
    }
}

/// Google Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL (without the `/models/...` suffix)
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Environment variable to read the API key from
    pub api_key_env: String,

    /// Tokens the model may spend thinking before it answers. Thinking
    /// tokens count against `prompt.max_output_tokens`. `0` turns thinking
    /// off, `-1` lets the model decide.
    pub thinking_budget: i32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            thinking_budget: 0,
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Chat Completions URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Environment variable to read the API key from
    pub api_key_env: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Anthropic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// Messages API URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Environment variable to read the API key from
    pub api_key_env: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}
