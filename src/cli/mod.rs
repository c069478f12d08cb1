//! Command-line interface for confcache.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`context`] - Settings resolution shared by all commands
//! - [`commands`] - Command implementations
//! - [`signal`] - Stop flag for `watch`

pub mod args;
pub mod commands;
pub mod context;
pub mod signal;

pub use args::{
    Cli, Commands, CompletionsArgs, GetArgs, InvalidateArgs, ListArgs, RenderArgs, TemplatesArgs,
    WatchArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use context::AppContext;
