//! Prompter Core - turn an image into a ready-to-copy text-to-image prompt.
//!
//! Prompter sends one image together with a fixed instruction template to a
//! hosted vision-language model and hands back the model's text.
//!
//! # Architecture
//!
//! ```text
//! Image file → ImageLoader → ImageInput ─┐
//!                                        ├→ PromptPipeline → VisionProvider → text | GenerationError
//! User's API key → Credential ───────────┘
//! ```
//!
//! The pipeline is immutable and shareable; the credential is passed on every
//! call and never stored.
//!
//! # Usage
//!
//! ```rust,ignore
//! use prompter_core::{Config, Credential, ImageLoader, PromptPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let image = ImageLoader::new(config.limits.clone())
//!         .load("./apple.jpg".as_ref())
//!         .await?;
//!     let pipeline = PromptPipeline::from_config(&config);
//!
//!     let prompt = pipeline
//!         .generate_prompt(&image, &Credential::new("my-api-key"))
//!         .await?;
//!     println!("{}", prompt.text);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod credential;
pub mod error;
pub mod input;
pub mod llm;
pub mod pipeline;
pub mod template;

// Re-exports for convenient access
pub use config::{Config, ProviderKind};
pub use credential::Credential;
pub use error::{ConfigError, GenerationError, ImageError, ERROR_MARKER};
pub use input::{ImageInput, ImageLoader, InputFormat};
pub use llm::{GeneratedPrompt, ProviderFactory, VisionProvider};
pub use pipeline::{
    display_text, GenerationOutcome, GenerationState, MissingInput, PromptPipeline, Session,
};
pub use template::{PromptTemplate, DEFAULT_TEMPLATE};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
