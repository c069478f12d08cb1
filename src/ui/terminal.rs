//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, ConfcacheTheme, OutputMode, UserInterface};

/// Terminal UI writing status to stdout and errors to stderr.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: ConfcacheTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode, colors: bool) -> Self {
        let theme = if colors {
            ConfcacheTheme::new()
        } else {
            ConfcacheTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_header(title)).ok();
        }
    }

    fn show_key_value(&mut self, key: &str, value: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_key_value(key, value)).ok();
        }
    }

    fn output(&mut self, text: &str) {
        if text.ends_with('\n') {
            write!(self.out, "{}", text).ok();
        } else {
            writeln!(self.out, "{}", text).ok();
        }
    }

    fn theme(&self) -> ConfcacheTheme {
        self.theme.clone()
    }
}

/// Create the UI for the given output mode.
///
/// Colors are used only on a TTY, and never with `no_color` or `NO_COLOR`.
pub fn create_ui(mode: OutputMode, no_color: bool) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode, !no_color && should_use_colors()))
}
