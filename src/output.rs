//! # Output Configuration
//!
//! Controls how operator-facing text looks: whether colors and emoji are
//! used, and which style each kind of outcome gets.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust
//! use up2::output::{ColorChoice, OutputConfig};
//! use up2::outcome::OutcomeKind;
//!
//! let out = OutputConfig::from_env_and_flag(ColorChoice::Never);
//! assert_eq!(out.emoji("✅", "[OK]"), "[OK]");
//! assert_eq!(out.outcome(OutcomeKind::Exists, "taken"), "taken");
//! ```

use std::env;
use std::fmt::Display;

use console::Style;

use crate::outcome::OutcomeKind;

/// The value of the `--color` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect from the terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `Always` overrides `NO_COLOR`. In `Auto` mode, colors are disabled
    /// if `NO_COLOR` is set (any value, including empty), `CLICOLOR=0`,
    /// `TERM=dumb`, or stdout is not a color-capable terminal (unless
    /// `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(choice: ColorChoice) -> Self {
        let use_color = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }

    /// The emoji when colors are enabled, the plain alternative otherwise.
    pub fn emoji<'a>(&self, emoji: &'a str, plain: &'a str) -> &'a str {
        if self.use_color {
            emoji
        } else {
            plain
        }
    }

    /// Render `text` with `style`, or as-is when colors are disabled.
    pub fn paint(&self, style: &Style, text: impl Display) -> String {
        style
            .clone()
            .force_styling(self.use_color)
            .apply_to(text)
            .to_string()
    }

    /// Render `text` in the color of an outcome kind.
    pub fn outcome(&self, kind: OutcomeKind, text: impl Display) -> String {
        self.paint(&outcome_style(kind), text)
    }

    pub fn warning(&self, text: impl Display) -> String {
        self.paint(&Style::new().yellow(), text)
    }

    pub fn error(&self, text: impl Display) -> String {
        self.paint(&Style::new().red(), text)
    }

    pub fn notice(&self, text: impl Display) -> String {
        self.paint(&Style::new().cyan().bold(), text)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag(ColorChoice::Auto)
    }
}

/// Green for created, yellow for existing, red for failed.
pub fn outcome_style(kind: OutcomeKind) -> Style {
    match kind {
        OutcomeKind::Success => Style::new().green(),
        OutcomeKind::Exists => Style::new().yellow(),
        OutcomeKind::Failed => Style::new().red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_always() {
        assert!(OutputConfig::from_env_and_flag(ColorChoice::Always).use_color);
    }

    #[test]
    fn test_color_never() {
        assert!(!OutputConfig::from_env_and_flag(ColorChoice::Never).use_color);
    }

    #[test]
    fn test_emoji_helper() {
        let on = OutputConfig { use_color: true };
        let off = OutputConfig { use_color: false };
        assert_eq!(on.emoji("🔍", "[SCAN]"), "🔍");
        assert_eq!(off.emoji("🔍", "[SCAN]"), "[SCAN]");
    }

    #[test]
    fn test_paint_without_color_is_plain() {
        let off = OutputConfig { use_color: false };
        assert_eq!(off.outcome(OutcomeKind::Failed, "boom"), "boom");
        assert_eq!(off.warning(42), "42");
    }

    #[test]
    fn test_paint_with_color_adds_escapes() {
        let on = OutputConfig { use_color: true };
        let painted = on.outcome(OutcomeKind::Success, "ok");
        assert!(painted.contains("ok"));
        assert!(painted.contains('\u{1b}'));
    }
}
