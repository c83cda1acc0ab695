//! Generate setup: credential resolution, pipeline assembly, spinner.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use prompter_core::{Config, Credential, PromptPipeline, ProviderFactory, ProviderKind};

/// Where a credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Flag,
    Env(String),
}

/// Pick the credential from `--api-key` first, then from `env_var`.
///
/// `lookup` reads an environment variable; an unset or blank variable counts
/// as absent. An explicit flag is returned even when blank so the caller can
/// warn about it instead of silently falling through.
pub fn resolve_credential(
    flag: Option<&str>,
    env_var: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<(Credential, CredentialSource)> {
    if let Some(key) = flag {
        return Some((Credential::new(key), CredentialSource::Flag));
    }

    lookup(env_var)
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            (
                Credential::new(value),
                CredentialSource::Env(env_var.to_string()),
            )
        })
}

/// Build the pipeline for `provider`, applying CLI overrides on top of the config.
pub fn build_pipeline(
    config: &Config,
    provider: ProviderKind,
    model_override: Option<&str>,
    template_file: Option<&Path>,
) -> anyhow::Result<PromptPipeline> {
    let mut config = config.clone();

    if let Some(path) = template_file {
        let template = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Cannot read template file {}: {e}", path.display())
        })?;
        if template.trim().is_empty() {
            anyhow::bail!("Template file {} is empty", path.display());
        }
        config.prompt.template = template;
    }

    let vision = ProviderFactory::create(provider, &config.llm, model_override);
    Ok(PromptPipeline::with_provider(vision, &config))
}

/// Spinner shown on stderr while a request is pending.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
