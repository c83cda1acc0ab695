//! Dialoguer theme, banner, and small output helpers for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// Returns a `ColorfulTheme` configured with Prompter's visual identity.
///
/// - Prompt prefix: magenta `?`
/// - Active item indicator: magenta `▸`
/// - Success prefix: green `✓`
/// - Error prefix: red `✗`
pub fn prompter_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().magenta(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().magenta(),
        active_item_style: Style::new().for_stderr().magenta(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Prints the Prompter banner to stderr.
pub fn print_banner() {
    let version_line = format!("Prompter v{}", prompter_core::VERSION);
    let tagline = "Turn any image into a text-to-image prompt";

    let inner_width = tagline.len() + 4;

    let top = format!("  ╔{:═<width$}╗", "", width = inner_width);
    let mid1 = format!("  ║{:^width$}║", version_line, width = inner_width);
    let mid2 = format!("  ║{:^width$}║", tagline, width = inner_width);
    let bot = format!("  ╚{:═<width$}╝", "", width = inner_width);

    let magenta = Style::new().for_stderr().magenta();

    eprintln!();
    eprintln!("{}", magenta.apply_to(&top));
    eprintln!("{}", magenta.apply_to(&mid1));
    eprintln!("{}", magenta.apply_to(&mid2));
    eprintln!("{}", magenta.apply_to(&bot));
    eprintln!();
}

/// Print a yellow warning line to stderr.
pub fn warn(message: impl std::fmt::Display) {
    let yellow = Style::new().for_stderr().yellow();
    eprintln!("  {} {}", yellow.apply_to("⚠"), yellow.apply_to(message));
}

/// Print a dim hint line to stderr.
pub fn hint(message: impl std::fmt::Display) {
    let dim = Style::new().for_stderr().dim();
    eprintln!("  {}", dim.apply_to(message));
}

/// Human-readable byte count, e.g. `42.1 KB`.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let bytes = bytes as f64;
    if bytes >= MB {
        format!("{:.1} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{bytes} B")
    }
}

/// Human-readable duration, e.g. `250ms` or `1.5s`.
pub fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}
