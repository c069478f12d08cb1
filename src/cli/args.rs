//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::reload::ReloadMode;

/// confcache - render configs from templates and keep the cache consistent.
#[derive(Debug, Parser)]
#[command(name = "confcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (default: ./confcache.yml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Organization namespace (overrides ORG_NAME and the config file)
    #[arg(long, global = true)]
    pub org: Option<String>,

    /// Template directory (overrides the config file)
    #[arg(short, long, global = true)]
    pub templates: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List loaded templates
    Templates(TemplatesArgs),

    /// Render a template and cache the result
    Render(RenderArgs),

    /// Print a cached config
    Get(GetArgs),

    /// List cached config ids
    List(ListArgs),

    /// Remove every cached config rendered from a template
    Invalidate(InvalidateArgs),

    /// Watch the template directory and cascade removals
    Watch(WatchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `templates` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TemplatesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `render` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RenderArgs {
    /// Template name (file name without suffix)
    pub template: String,

    /// Id to cache the rendered config under
    #[arg(long)]
    pub id: String,

    /// Template variable as NAME=VALUE (repeatable)
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,
}

/// Arguments for the `get` command.
#[derive(Debug, Clone, clap::Args)]
pub struct GetArgs {
    /// Config id
    pub id: String,

    /// Also show which template produced it
    #[arg(long)]
    pub with_template: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `invalidate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct InvalidateArgs {
    /// Template name
    pub template: String,
}

/// Arguments for the `watch` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct WatchArgs {
    /// Reload driver (overrides reload.mode)
    #[arg(long, value_enum)]
    pub mode: Option<ReloadMode>,

    /// Poll interval, e.g. 30s or 5m (overrides reload.interval)
    #[arg(long)]
    pub interval: Option<String>,

    /// Stop after this long instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration: Option<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
