//! Guided prompt generation.
//!
//! Walks the user through: image path → API key (once per session) →
//! generation with a spinner → result → what next.

use std::path::PathBuf;

use console::Style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use prompter_core::{Config, GenerationState, ImageInput, ImageLoader};

use super::theme::{format_size, hint, prompter_theme, warn};
use super::{setup, InteractiveState};
use crate::cli::generate::create_spinner;

/// What the user wants after seeing a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextStep {
    Again,
    NewImage,
    NewKey,
    Back,
}

const NEXT_ITEMS: &[(&str, NextStep)] = &[
    ("Generate again", NextStep::Again),
    ("Choose a new image", NextStep::NewImage),
    ("Enter a different API key", NextStep::NewKey),
    ("Back to main menu", NextStep::Back),
];

/// Walk the user through generating one or more prompts.
pub async fn guided_generate(config: &Config, state: &mut InteractiveState) -> anyhow::Result<()> {
    let theme = prompter_theme();

    // ── Step 1: Image ───────────────────────────────────────────────────────

    let mut need_image = match state.session.image() {
        Some(current) => !reuse_current_image(&theme, current)?,
        None => true,
    };

    loop {
        if need_image {
            let Some(image) = choose_image(config, &theme).await? else {
                return Ok(());
            };
            state.session.set_image(image);
            need_image = false;
        }

        // ── Step 2: API key (asked once per session) ────────────────────────

        if !state.session.has_credential() {
            let Some(credential) = setup::obtain_credential(config, state.provider)? else {
                return Ok(());
            };
            state.session.set_credential(credential);
        }

        // ── Step 3: Generate ────────────────────────────────────────────────

        let spinner = create_spinner(&format!(
            "Analyzing image with {}...",
            state.pipeline.model()
        ));
        let result = state.session.generate(&state.pipeline).await.cloned();
        spinner.finish_and_clear();

        match result {
            Ok(outcome) => show_result(&outcome),
            Err(missing) => {
                warn(missing);
                eprintln!();
                return Ok(());
            }
        }

        // ── Step 4: What next ───────────────────────────────────────────────

        match next_step(&theme)? {
            NextStep::Again => {}
            NextStep::NewImage => need_image = true,
            NextStep::NewKey => {
                let Some(credential) = setup::prompt_credential(state.provider)? else {
                    return Ok(());
                };
                state.session.set_credential(credential);
            }
            NextStep::Back => return Ok(()),
        }
    }
}

/// Ask whether to keep working with the image already in the session.
fn reuse_current_image(theme: &ColorfulTheme, current: &ImageInput) -> anyhow::Result<bool> {
    let name = current.file_name.as_deref().unwrap_or("current image");
    let items = [format!("Use {name} again"), "Choose a new image".to_string()];

    let choice = Select::with_theme(theme)
        .with_prompt("Image")
        .items(&items)
        .default(0)
        .interact_opt()?;
    Ok(matches!(choice, Some(0)))
}

/// Prompt for an image path until one loads. Returns `None` on Ctrl+C.
async fn choose_image(config: &Config, theme: &ColorfulTheme) -> anyhow::Result<Option<ImageInput>> {
    let loader = ImageLoader::new(config.limits.clone());

    loop {
        let Some(raw_path) = super::handle_interrupt(
            Input::<String>::with_theme(theme)
                .with_prompt("Path to a JPEG or PNG image")
                .interact_text(),
        )?
        else {
            return Ok(None);
        };

        let path = PathBuf::from(shellexpand::tilde(raw_path.trim()).into_owned());

        match loader.load(&path).await {
            Ok(image) => {
                hint(format!(
                    "Loaded {} ({}, {}x{}, {})",
                    image.file_name.as_deref().unwrap_or("image"),
                    image.format,
                    image.width,
                    image.height,
                    format_size(image.file_size())
                ));
                return Ok(Some(image));
            }
            Err(e) => {
                tracing::debug!("Rejected {}: {e}", path.display());
                warn(e);
            }
        }
    }
}

/// Render a finished attempt. The prompt itself goes to stdout so it can be
/// copied or piped; everything around it goes to stderr.
fn show_result(outcome: &GenerationState) {
    let dim = Style::new().for_stderr().dim();

    match outcome {
        GenerationState::Succeeded(prompt) => {
            let green = Style::new().for_stderr().green();
            eprintln!();
            eprintln!(
                "  {} {}",
                green.apply_to("✓ Prompt ready"),
                dim.apply_to(format!(
                    "({}, {:.1}s)",
                    prompt.model,
                    prompt.latency_ms as f64 / 1000.0
                ))
            );
            eprintln!("{}", dim.apply_to("─".repeat(60)));
            println!("{}", prompt.text);
            eprintln!("{}", dim.apply_to("─".repeat(60)));
            hint("Copy the text above and paste it into your image generator.");
            eprintln!();
        }
        GenerationState::Failed(err) => {
            let red = Style::new().for_stderr().red();
            eprintln!();
            eprintln!("  {} {}", red.apply_to("✗"), red.apply_to(err.display_text()));
            eprintln!();
        }
        GenerationState::Idle | GenerationState::Requesting => {}
    }
}

fn next_step(theme: &ColorfulTheme) -> anyhow::Result<NextStep> {
    let items: Vec<&str> = NEXT_ITEMS.iter().map(|(label, _)| *label).collect();
    let choice = Select::with_theme(theme)
        .with_prompt("What next?")
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(choice.map_or(NextStep::Back, |i| NEXT_ITEMS[i].1))
}
