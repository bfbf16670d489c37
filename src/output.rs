//! # Output Configuration
//!
//! Controls how the CLI decorates its human-facing output. Status lines start
//! with a [`Marker`], rendered as an emoji on colour-capable terminals and as
//! a bracketed tag (`[OK]`, `[WARN]`, ...) otherwise.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` CLI flag
//! - `NO_COLOR` disables colors when set, whatever its value
//! - `CLICOLOR=0` disables colors
//! - `CLICOLOR_FORCE=1` forces colors even when stdout is not a TTY
//! - `TERM=dumb` disables colors
//!
//! ```rust,ignore
//! use solution_build::output::{Marker, OutputConfig};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! println!("{} Build order", out.marker(Marker::Plan));
//! ```

use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

/// The kinds of status line the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Scan,
    Plan,
    Ok,
    Warn,
    Err,
    Info,
    Tree,
}

impl Marker {
    fn emoji(&self) -> &'static str {
        match self {
            Marker::Scan => "🔍",
            Marker::Plan => "📦",
            Marker::Ok => "✅",
            Marker::Warn => "⚠️",
            Marker::Err => "❌",
            Marker::Info => "📊",
            Marker::Tree => "🌳",
        }
    }

    fn plain(&self) -> &'static str {
        match self {
            Marker::Scan => "[SCAN]",
            Marker::Plan => "[PLAN]",
            Marker::Ok => "[OK]",
            Marker::Warn => "[WARN]",
            Marker::Err => "[ERR]",
            Marker::Info => "[INFO]",
            Marker::Tree => "[TREE]",
        }
    }
}

impl OutputConfig {
    /// Create an output configuration from the `--color` flag value
    /// (`always`, `never` or `auto`) and the environment.
    ///
    /// In auto mode, colors are disabled if `NO_COLOR` is set, `CLICOLOR=0`,
    /// `TERM=dumb`, or stdout is not a TTY (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
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

    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// The prefix for a status line of kind `marker`.
    pub fn marker(&self, marker: Marker) -> &'static str {
        if self.use_color {
            marker.emoji()
        } else {
            marker.plain()
        }
    }

    /// `text` in bold when colors are enabled.
    pub fn strong(&self, text: &str) -> String {
        if self.use_color {
            console::style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
