//! Provider setup: vision service and model selection, API key entry.
//!
//! Keys entered here live only in the running session. Nothing is written to
//! disk.

use console::Style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password, Select};
use prompter_core::{Config, Credential, ProviderKind};

use super::theme::{hint, prompter_theme};
use super::InteractiveState;
use crate::cli::generate::{build_pipeline, resolve_credential, CredentialSource};

/// Providers in menu order.
const PROVIDERS: &[ProviderKind] = &[
    ProviderKind::Gemini,
    ProviderKind::Openai,
    ProviderKind::Anthropic,
];

/// Well-known vision models per provider, with a short note.
fn suggested_models(provider: ProviderKind) -> &'static [(&'static str, &'static str)] {
    match provider {
        ProviderKind::Gemini => &[
            ("gemini-2.5-flash", "recommended"),
            ("gemini-2.5-flash-lite", "faster, cheaper"),
        ],
        ProviderKind::Openai => &[
            ("gpt-4o-mini", "recommended"),
            ("gpt-4o", "more detail, pricier"),
        ],
        ProviderKind::Anthropic => &[
            ("claude-sonnet-4-20250514", "recommended"),
            ("claude-haiku-4-5-20251001", "faster, cheaper"),
        ],
    }
}

/// Where to get a key for `provider`.
fn key_hint(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Gemini => "Get a free key at https://aistudio.google.com/apikey",
        ProviderKind::Openai => "Create a key at https://platform.openai.com/api-keys",
        ProviderKind::Anthropic => "Create a key at https://console.anthropic.com/settings/keys",
    }
}

/// Let the user switch vision service and model.
///
/// Switching to a different service forgets the session's key, since a key
/// for one service never works for another.
pub fn choose_provider(config: &Config, state: &mut InteractiveState) -> anyhow::Result<()> {
    let theme = prompter_theme();

    let items: Vec<&str> = PROVIDERS.iter().map(|p| p.label()).collect();
    let current = PROVIDERS
        .iter()
        .position(|p| *p == state.provider)
        .unwrap_or(0);

    let Some(choice) = Select::with_theme(&theme)
        .with_prompt("Vision service")
        .items(&items)
        .default(current)
        .interact_opt()?
    else {
        return Ok(());
    };
    let provider = PROVIDERS[choice];

    let Some(model) = select_model(provider, config, &theme)? else {
        return Ok(());
    };

    state.pipeline = build_pipeline(config, provider, Some(&model), None)?;
    if provider != state.provider {
        state.session.clear_credential();
    }
    state.provider = provider;

    let green = Style::new().for_stderr().green();
    eprintln!(
        "  {} Using {} ({})",
        green.apply_to("✓"),
        provider.label(),
        state.pipeline.model()
    );
    eprintln!();
    Ok(())
}

/// Pick a model for `provider`, defaulting to the configured one.
fn select_model(
    provider: ProviderKind,
    config: &Config,
    theme: &ColorfulTheme,
) -> anyhow::Result<Option<String>> {
    let configured = config.llm.model(provider);
    let suggested = suggested_models(provider);

    let mut models: Vec<String> = suggested.iter().map(|(m, _)| m.to_string()).collect();
    let mut items: Vec<String> = suggested
        .iter()
        .map(|(model, note)| format!("{model} ({note})"))
        .collect();
    if !models.contains(&configured) {
        items.insert(0, format!("{configured} (configured)"));
        models.insert(0, configured.clone());
    }
    items.push("Custom model name...".to_string());

    let default = models.iter().position(|m| *m == configured).unwrap_or(0);
    let choice = Select::with_theme(theme)
        .with_prompt(format!("{} model", provider.label()))
        .items(&items)
        .default(default)
        .interact_opt()?;

    match choice {
        Some(i) if i < models.len() => Ok(Some(models[i].clone())),
        Some(_) => prompt_custom_model(theme),
        None => Ok(None),
    }
}

/// Prompt for a custom model name.
fn prompt_custom_model(theme: &ColorfulTheme) -> anyhow::Result<Option<String>> {
    let Some(model) = super::handle_interrupt(
        Input::<String>::with_theme(theme)
            .with_prompt("Model name")
            .interact_text(),
    )?
    else {
        return Ok(None);
    };
    let model = model.trim();
    if model.is_empty() {
        Ok(None)
    } else {
        Ok(Some(model.to_string()))
    }
}

/// Get a key for `provider`: from its environment variable if set,
/// otherwise from a hidden prompt.
///
/// Returns `None` on Ctrl+C. An empty entry is returned as an empty
/// credential so the caller can warn about it.
pub fn obtain_credential(
    config: &Config,
    provider: ProviderKind,
) -> anyhow::Result<Option<Credential>> {
    let env_var = config.llm.api_key_env(provider);
    if let Some((credential, CredentialSource::Env(var))) =
        resolve_credential(None, &env_var, |name| std::env::var(name).ok())
    {
        hint(format!("Using API key from {var}"));
        return Ok(Some(credential));
    }

    prompt_credential(provider)
}

/// Ask for a key with hidden input, ignoring the environment.
pub fn prompt_credential(provider: ProviderKind) -> anyhow::Result<Option<Credential>> {
    let theme = prompter_theme();
    hint(key_hint(provider));

    let key = super::handle_interrupt(
        Password::with_theme(&theme)
            .with_prompt(format!("Your {} API key", provider.label()))
            .allow_empty_password(true)
            .interact(),
    )?;
    Ok(key.map(Credential::new))
}
