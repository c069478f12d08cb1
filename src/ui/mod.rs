//! Terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal usage
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use confcache::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(OutputMode::Quiet, true);
//! ui.show_header("Templates");
//! ui.success("Reload complete");
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, ConfcacheTheme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Change the output mode.
    fn set_output_mode(&mut self, mode: OutputMode);

    /// Display a status message.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a header line.
    fn show_header(&mut self, title: &str);

    /// Show a `key: value` line.
    fn show_key_value(&mut self, key: &str, value: &str);

    /// Write command output (rendered configs, JSON). Shown in every mode.
    fn output(&mut self, text: &str);

    /// The theme used to style command output.
    ///
    /// Plain when colors are disabled, so callers formatting their own
    /// lines honor `--no-color` and `NO_COLOR`.
    fn theme(&self) -> ConfcacheTheme;
}
