//! # Output Configuration & Report Stream
//!
//! Controls CLI output appearance and formats the materialization report:
//! one line per terminal resource of the form
//!
//! ```text
//! <origin-tag> --> <destination-path>[/*]
//! ```
//!
//! where the trailing `/*` marks a destination entry that is a linked
//! directory (the whole subtree shares one link).
//!
//! ## Respecting User Preferences
//!
//! Color handling respects:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;
use std::io::{self, Write};
use std::path::Path;

use console::style;

use crate::error::Result;
use crate::merge::Origin;

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// - `--color=always`: Force colors on (overrides NO_COLOR)
    /// - `--color=never`: Force colors off
    /// - `--color=auto`: Detect based on environment
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even empty) disables colors
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

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Streams materialization report lines to any writer.
///
/// The dry-run and real-run report for the same inputs must be identical,
/// so this is the only place report lines are formatted.
pub struct Report<W: Write> {
    writer: W,
    config: OutputConfig,
}

impl<W: Write> Report<W> {
    pub fn new(writer: W, config: OutputConfig) -> Self {
        Self { writer, config }
    }

    /// Emit one terminal-resource line. `linked_dir` appends the `/*`
    /// marker indicating the whole subtree is linked as a unit.
    pub fn resource(&mut self, origin: Origin, dest: &Path, linked_dir: bool) -> Result<()> {
        let tag = if self.config.use_color {
            match origin {
                Origin::Src => style(origin.as_str()).cyan().to_string(),
                Origin::Apply => style(origin.as_str()).green().to_string(),
            }
        } else {
            origin.as_str().to_string()
        };
        let marker = if linked_dir { "/*" } else { "" };
        writeln!(self.writer, "{} --> {}{}", tag, dest.display(), marker)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// A report that streams straight to stdout.
pub fn stdout_report(config: OutputConfig) -> Report<io::Stdout> {
    Report::new(io::stdout(), config)
}
