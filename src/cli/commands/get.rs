//! Get command implementation.
//!
//! The `confcache get` command prints a cached config, optionally with the
//! template that produced it.

use crate::cli::args::GetArgs;
use crate::cli::context::AppContext;
use crate::error::{ConfcacheError, Result};
use crate::store::ConfigStore;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The get command implementation.
pub struct GetCommand {
    context: AppContext,
    args: GetArgs,
}

impl GetCommand {
    /// Create a new get command.
    pub fn new(context: AppContext, args: GetArgs) -> Self {
        Self { context, args }
    }

    fn run(&self, store: &ConfigStore, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let content = match store.get(&self.args.id) {
            Ok(content) => content,
            Err(e) if e.is_not_found() => {
                ui.error(&format!("No cached config '{}'", self.args.id));
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };

        if self.args.with_template {
            match store.get_template(&self.args.id) {
                Ok(template) => ui.show_key_value("template", &template),
                Err(ConfcacheError::ProvenanceNotFound { .. }) => {
                    ui.warning(&format!("No provenance recorded for '{}'", self.args.id));
                }
                Err(e) => return Err(e),
            }
        }

        ui.output(&content);
        Ok(CommandResult::success())
    }
}

impl Command for GetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = self.context.open_store()?;
        self.run(&store, ui)
    }
}
