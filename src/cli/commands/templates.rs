//! Templates command implementation.
//!
//! The `confcache templates` command lists the templates found in the
//! template directory.

use serde::Serialize;

use crate::cli::args::TemplatesArgs;
use crate::cli::context::AppContext;
use crate::error::{ConfcacheError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

#[derive(Debug, Serialize)]
struct TemplateEntry {
    name: String,
    path: String,
    variables: Vec<String>,
}

/// The templates command implementation.
pub struct TemplatesCommand {
    context: AppContext,
    args: TemplatesArgs,
}

impl TemplatesCommand {
    /// Create a new templates command.
    pub fn new(context: AppContext, args: TemplatesArgs) -> Self {
        Self { context, args }
    }

    fn entries(&self) -> Result<Vec<TemplateEntry>> {
        let registry = self.context.load_registry()?;
        Ok(registry
            .names()
            .into_iter()
            .filter_map(|name| registry.get(&name))
            .map(|template| TemplateEntry {
                name: template.name.clone(),
                path: template.source_path.display().to_string(),
                variables: template.variables().into_iter().map(String::from).collect(),
            })
            .collect())
    }
}

impl Command for TemplatesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let entries = self.entries()?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| ConfcacheError::Other(e.into()))?;
            ui.output(&json);
            return Ok(CommandResult::success());
        }

        if entries.is_empty() {
            ui.warning(&format!(
                "No templates in {}",
                self.context.settings().templates.directory.display()
            ));
            return Ok(CommandResult::success());
        }

        let theme = ui.theme();
        ui.show_header("Templates");
        for entry in &entries {
            let vars = if entry.variables.is_empty() {
                String::new()
            } else {
                format!(" {}", theme.dim.apply_to(format!("({})", entry.variables.join(", "))))
            };
            ui.output(&format!("{}{}", entry.name, vars));
            if ui.output_mode().shows_detail() {
                ui.message(&format!("  {}", theme.dim.apply_to(&entry.path)));
            }
        }

        Ok(CommandResult::success())
    }
}
