//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::cli::context::AppContext;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: AppContext,
}

impl CommandDispatcher {
    /// Create a new dispatcher over resolved settings.
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }

    /// The resolved context.
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = self.context.clone();
        match &cli.command {
            Commands::Templates(args) => {
                super::templates::TemplatesCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Render(args) => {
                super::render::RenderCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Get(args) => super::get::GetCommand::new(ctx, args.clone()).execute(ui),
            Commands::List(args) => super::list::ListCommand::new(ctx, args.clone()).execute(ui),
            Commands::Invalidate(args) => {
                super::invalidate::InvalidateCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Watch(args) => {
                super::watch::WatchCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
        }
    }
}
