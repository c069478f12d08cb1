//! Invalidate command implementation.
//!
//! The `confcache invalidate` command removes every cached config that a
//! template produced, whether or not the template still exists.

use crate::cli::args::InvalidateArgs;
use crate::cli::context::AppContext;
use crate::error::Result;
use crate::store::ConfigStore;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The invalidate command implementation.
pub struct InvalidateCommand {
    context: AppContext,
    args: InvalidateArgs,
}

impl InvalidateCommand {
    /// Create a new invalidate command.
    pub fn new(context: AppContext, args: InvalidateArgs) -> Self {
        Self { context, args }
    }

    fn run(&self, store: &ConfigStore, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = store.cascade(&self.args.template)?;

        if ui.output_mode().shows_detail() {
            for id in &report.removed {
                ui.message(&format!("  removed {}", id));
            }
        }

        if !report.is_complete() {
            ui.warning(&format!(
                "Could not remove {} config(s): {}",
                report.failed.len(),
                report.failed.join(", ")
            ));
            return Ok(CommandResult::failure(1));
        }

        ui.success(&format!(
            "Removed {} config(s) rendered from '{}'",
            report.removed.len(),
            self.args.template
        ));
        Ok(CommandResult::success())
    }
}

impl Command for InvalidateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = self.context.open_store()?;
        self.run(&store, ui)
    }
}
