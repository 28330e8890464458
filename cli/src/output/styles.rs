//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Centralized stylesheet for CLI output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// Success messages (green)
    pub success: Style,
    /// Warning messages (yellow)
    pub warning: Style,
    /// Step / progress markers (cyan)
    pub step: Style,
    /// Remote stdout lines
    pub remote: Style,
    /// Remote stderr lines (yellow, dimmed)
    pub remote_err: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.step = Style::new().cyan();
        self.remote = Style::new().dimmed();
        self.remote_err = Style::new().yellow().dimmed();
    }
}
