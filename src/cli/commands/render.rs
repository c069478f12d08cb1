//! Render command implementation.
//!
//! The `confcache render` command renders one template, caches the result
//! under the given id with provenance, and prints it.

use crate::cli::args::RenderArgs;
use crate::cli::context::AppContext;
use crate::error::{ConfcacheError, Result};
use crate::render::ConfigRenderer;
use crate::template::RenderContext;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The render command implementation.
pub struct RenderCommand {
    context: AppContext,
    args: RenderArgs,
}

impl RenderCommand {
    /// Create a new render command.
    pub fn new(context: AppContext, args: RenderArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RenderArgs {
        &self.args
    }
}

impl Command for RenderCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let vars = match RenderContext::from_pairs(&self.args.vars) {
            Ok(vars) => vars,
            Err(message) => {
                ui.error(&format!("Invalid --set value: {}", message));
                return Ok(CommandResult::failure(2));
            }
        };

        let renderer = ConfigRenderer::new(self.context.load_registry()?, self.context.open_store()?);
        match renderer.render(&self.args.template, &self.args.id, &vars) {
            Ok(content) => {
                ui.output(&content);
                ui.success(&format!(
                    "Cached '{}' from template '{}'",
                    self.args.id, self.args.template
                ));
                Ok(CommandResult::success())
            }
            Err(ConfcacheError::UnknownTemplate { name }) => {
                ui.error(&format!("Unknown template '{}'", name));
                Ok(CommandResult::failure(1))
            }
            Err(e) => Err(e),
        }
    }
}
