//! The `prompter generate` command for turning one image into a prompt.

mod setup;
pub mod types;

pub use setup::{build_pipeline, create_spinner, resolve_credential, CredentialSource};
pub use types::{OutputFormat, ProviderArg};

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Args;
use prompter_core::{
    Config, Credential, GeneratedPrompt, GenerationState, ImageInput, ImageLoader, ProviderKind,
    Session,
};

use types::PromptRecord;

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// JPEG or PNG image to describe
    #[arg(required = true)]
    pub image: PathBuf,

    /// Vision service to ask (defaults to `llm.provider` from the config)
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Model name (provider-specific)
    #[arg(short, long)]
    pub model: Option<String>,

    /// API key for this call; falls back to the provider's environment variable
    #[arg(long)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Send the instruction in this file instead of the configured template
    #[arg(long)]
    pub template: Option<PathBuf>,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs, config: Config) -> anyhow::Result<()> {
    let provider = args
        .provider
        .map(ProviderKind::from)
        .unwrap_or(config.llm.provider);
    let pipeline = build_pipeline(
        &config,
        provider,
        args.model.as_deref(),
        args.template.as_deref(),
    )?;

    let path = PathBuf::from(shellexpand::tilde(&args.image.to_string_lossy()).into_owned());
    let image = ImageLoader::new(config.limits.clone()).load(&path).await?;
    tracing::info!(
        "Loaded {} ({}, {}x{})",
        path.display(),
        image.format,
        image.width,
        image.height
    );

    let mut session = Session::new();
    session.set_image(image);
    if let Some(credential) = obtain_credential(&args, &config, provider)? {
        session.set_credential(credential);
    }

    if let Err(missing) = session.readiness() {
        tracing::warn!("{missing}");
        anyhow::bail!(
            "{missing}\n\n  Hint: pass --api-key or set {}.",
            config.llm.api_key_env(provider)
        );
    }

    let spinner = create_spinner(&format!(
        "Asking {} ({}) for a prompt...",
        provider.label(),
        pipeline.model()
    ));
    let state = session.generate(&pipeline).await.cloned();
    spinner.finish_and_clear();

    match state? {
        GenerationState::Succeeded(prompt) => {
            let image = session
                .image()
                .ok_or_else(|| anyhow::anyhow!("image missing from session"))?;
            let rendered = render(args.format, image, pipeline.provider_name(), &prompt)?;
            match &args.output {
                Some(output) => {
                    std::fs::write(output, &rendered)?;
                    tracing::info!("Prompt written to {:?}", output);
                }
                None => println!("{rendered}"),
            }
            Ok(())
        }
        GenerationState::Failed(err) => Err(err.into()),
        GenerationState::Idle | GenerationState::Requesting => {
            anyhow::bail!("generation did not finish")
        }
    }
}

/// Use the flag or environment credential, or ask for one on a terminal.
fn obtain_credential(
    args: &GenerateArgs,
    config: &Config,
    provider: ProviderKind,
) -> anyhow::Result<Option<Credential>> {
    let env_var = config.llm.api_key_env(provider);

    if let Some((credential, source)) =
        resolve_credential(args.api_key.as_deref(), &env_var, |name| {
            std::env::var(name).ok()
        })
    {
        if let CredentialSource::Env(var) = source {
            tracing::debug!("Using API key from {var}");
        }
        return Ok(Some(credential));
    }

    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let key = dialoguer::Password::new()
        .with_prompt(format!("{} API key ({env_var} not set)", provider.label()))
        .allow_empty_password(true)
        .interact()?;
    Ok(Some(Credential::new(key)))
}

/// Render a successful result in the requested format.
fn render(
    format: OutputFormat,
    image: &ImageInput,
    provider: &str,
    prompt: &GeneratedPrompt,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(prompt.text.clone()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&PromptRecord::new(
            image, provider, prompt,
        ))?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use prompter_core::InputFormat;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: GenerateArgs,
    }

    fn parse(argv: &[&str]) -> Result<GenerateArgs, clap::Error> {
        let mut full = vec!["prompter"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).map(|cli| cli.args)
    }

    fn sample_image() -> ImageInput {
        ImageInput {
            bytes: vec![0xFF, 0xD8, 0xFF],
            format: InputFormat::Jpeg,
            width: 500,
            height: 500,
            file_name: Some("apple.jpg".to_string()),
        }
    }

    fn sample_prompt() -> GeneratedPrompt {
        GeneratedPrompt {
            text: "A red apple on a wooden table, photorealistic, soft lighting, 8k".to_string(),
            model: "gemini-2.5-flash".to_string(),
            tokens_used: Some(812),
            latency_ms: 1450,
        }
    }

    #[test]
    fn generate_args_defaults() {
        let args = parse(&["apple.jpg"]).unwrap();
        assert_eq!(args.image, PathBuf::from("apple.jpg"));
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.provider.is_none());
        assert!(args.model.is_none());
        assert!(args.api_key.is_none());
        assert!(args.output.is_none());
        assert!(args.template.is_none());
    }

    #[test]
    fn generate_args_require_image() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn generate_args_provider_maps_to_core_kind() {
        let args = parse(&["apple.jpg", "--provider", "anthropic", "-m", "claude-x"]).unwrap();
        assert_eq!(
            args.provider.map(ProviderKind::from),
            Some(ProviderKind::Anthropic)
        );
        assert_eq!(args.model.as_deref(), Some("claude-x"));
    }

    #[test]
    fn generate_args_reject_unknown_provider() {
        assert!(parse(&["apple.jpg", "--provider", "ollama"]).is_err());
    }

    #[test]
    fn render_text_is_prompt_verbatim() {
        let prompt = sample_prompt();
        let text = render(OutputFormat::Text, &sample_image(), "gemini", &prompt).unwrap();
        assert_eq!(text, prompt.text);
    }

    #[test]
    fn render_json_includes_details() {
        let text = render(
            OutputFormat::Json,
            &sample_image(),
            "gemini",
            &sample_prompt(),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["file"], "apple.jpg");
        assert_eq!(value["format"], "jpeg");
        assert_eq!(value["width"], 500);
        assert_eq!(value["provider"], "gemini");
        assert_eq!(value["model"], "gemini-2.5-flash");
        assert_eq!(value["tokens_used"], 812);
        assert_eq!(
            value["prompt"],
            "A red apple on a wooden table, photorealistic, soft lighting, 8k"
        );
    }
}
