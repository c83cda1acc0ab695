//! Interactive CLI mode, the guided experience for bare `prompter` invocation.
//!
//! When `prompter` is invoked with no subcommand on a TTY, this module
//! provides a menu-driven interface over the same session and pipeline the
//! `generate` command uses.

pub mod generate;
pub mod setup;
pub mod theme;

use console::Style;
use dialoguer::Select;
use prompter_core::{Config, PromptPipeline, ProviderKind, Session};

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
///
/// Use this to wrap `interact_text()` / `interact()` calls that lack an `_opt`
/// variant, so interrupts exit the current flow cleanly instead of panicking.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Everything one interactive run remembers between menu choices.
pub struct InteractiveState {
    /// Selected image, entered key, and last result
    pub session: Session,
    /// Service the pipeline talks to
    pub provider: ProviderKind,
    pub pipeline: PromptPipeline,
}

impl InteractiveState {
    pub fn new(config: &Config) -> Self {
        Self {
            session: Session::new(),
            provider: config.llm.provider,
            pipeline: PromptPipeline::from_config(config),
        }
    }
}

/// Main menu options presented to the user.
const MENU_ITEMS: &[&str] = &[
    "Generate a prompt from an image",
    "Switch vision service / model",
    "Show configuration",
    "Exit",
];

/// Entry point for interactive mode.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::prompter_theme();
    let mut state = InteractiveState::new(config);

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => generate::guided_generate(config, &mut state).await?,
            Some(1) => setup::choose_provider(config, &mut state)?,
            Some(2) => show_config(config, &state)?,
            Some(3) | None => break, // Exit or Ctrl+C / Esc
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// Interactive config viewer: a summary of current settings plus options to
/// display the full TOML or the instruction template.
fn show_config(config: &Config, state: &InteractiveState) -> anyhow::Result<()> {
    let theme = theme::prompter_theme();
    let dim = Style::new().for_stderr().dim();
    let magenta = Style::new().for_stderr().magenta();
    let label = Style::new().for_stderr().bold();

    loop {
        eprintln!();
        eprintln!("  {}", magenta.apply_to("Current configuration:"));
        eprintln!();

        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };

        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Vision service:"),
            state.provider.label()
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Model:"),
            state.pipeline.model()
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("API key:"),
            key_status(config, state)
        );
        eprintln!(
            "    {:<20} {} MB, {}px",
            label.apply_to("Image limits:"),
            config.limits.max_file_size_mb,
            config.limits.max_image_dimension
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Request timeout:"),
            theme::format_duration_ms(config.limits.request_timeout_ms)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        let items = &[
            "View full config (TOML)",
            "View instruction template",
            "Back",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => print_block(&toml),
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                    eprintln!();
                }
            },
            Some(1) => print_block(state.pipeline.template().as_str()),
            Some(2) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// Where the key for the active service will come from. Never shows the key.
fn key_status(config: &Config, state: &InteractiveState) -> String {
    if state.session.has_credential() {
        return "entered for this session".to_string();
    }
    let env_var = config.llm.api_key_env(state.provider);
    match std::env::var(&env_var) {
        Ok(value) if !value.trim().is_empty() => format!("from {env_var}"),
        _ => format!("not set (will ask; or set {env_var})"),
    }
}

fn print_block(text: &str) {
    let dim = Style::new().for_stderr().dim();
    eprintln!();
    eprintln!("{}", dim.apply_to("─".repeat(50)));
    eprintln!("{text}");
    eprintln!("{}", dim.apply_to("─".repeat(50)));
    eprintln!();
}
