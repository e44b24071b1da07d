//! # Output Configuration
//!
//! Controls the appearance of the post-scan summary: whether glyphs and
//! colors are used, based on terminal capabilities and user preference.
//!
//! Honored, in order of precedence:
//! - `--color=never|always|auto` CLI flag
//! - `NO_COLOR` - disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - disables colors
//! - `CLICOLOR_FORCE=1` - forces colors even in non-TTY
//! - `TERM=dumb` - disables colors
//! - otherwise, the `console` crate's terminal detection

use std::env;

/// Output configuration for the CLI summary.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether glyphs and colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Build a configuration from the `--color` flag value and the
    /// environment.
    ///
    /// `always` forces decoration on (overriding `NO_COLOR`), `never`
    /// forces it off, anything else auto-detects.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // NO_COLOR disables on presence alone, even when empty
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

    /// Create a configuration with decoration always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with decoration always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Pick the glyph or its plain-text stand-in based on the configuration.
///
/// ```rust,ignore
/// let config = OutputConfig::from_env_and_flag("auto");
/// println!("{} 12 projects indexed", emoji(&config, "✅", "[OK]"));
/// ```
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
