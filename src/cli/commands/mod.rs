//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`confcache render`, `confcache watch`)
//! - Shared settings resolution
//! - Consistent global flag handling

pub mod completions;
pub mod dispatcher;
pub mod get;
pub mod invalidate;
pub mod list;
pub mod render;
pub mod templates;
pub mod watch;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
