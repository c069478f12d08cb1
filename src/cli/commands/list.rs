//! List command implementation.
//!
//! The `confcache list` command lists the ids cached for the organization.

use crate::cli::args::ListArgs;
use crate::cli::context::AppContext;
use crate::error::{ConfcacheError, Result};
use crate::store::ConfigStore;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    context: AppContext,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(context: AppContext, args: ListArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }

    fn run(&self, store: &ConfigStore, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ids = store.get_all()?;

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&ids).map_err(|e| ConfcacheError::Other(e.into()))?;
            ui.output(&json);
            return Ok(CommandResult::success());
        }

        if ids.is_empty() {
            ui.message(&format!(
                "No cached configs for '{}'",
                store.organization()
            ));
            return Ok(CommandResult::success());
        }

        let theme = ui.theme();
        ui.show_header(&format!("Cached configs ({})", store.organization()));
        let detail = ui.output_mode().shows_detail();
        for id in &ids {
            if detail {
                let template = store.get_template(id).ok();
                ui.output(&theme.format_provenance(id, template.as_deref()));
            } else {
                ui.output(id);
            }
        }

        Ok(CommandResult::success())
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = self.context.open_store()?;
        self.run(&store, ui)
    }
}
