//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events and remote output
//! without depending on any presentation type directly.

use owo_colors::OwoColorize as _;

use crate::application::ports::{OutputStream, ProgressReporter};
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"`
/// - `success()` prints `"  ✓ {message}"`
/// - `warn()` prints `"  ! {message}"`
/// - `output()` prints the remote line indented under the current step
///
/// Everything is suppressed when `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// The text printed for one remote output line, without the newline.
    #[must_use]
    pub fn format_output(&self, stream: OutputStream, line: &str) -> String {
        let style = match stream {
            OutputStream::Stdout => self.ctx.styles.remote,
            OutputStream::Stderr => self.ctx.styles.remote_err,
        };
        format!("    {}", line.style(style))
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.ctx.step(message);
    }

    fn success(&self, message: &str) {
        self.ctx.success(message);
    }

    fn warn(&self, message: &str) {
        self.ctx.warn(message);
    }

    fn output(&self, stream: OutputStream, line: &str) {
        if !self.ctx.quiet {
            println!("{}", self.format_output(stream, line));
        }
    }
}
