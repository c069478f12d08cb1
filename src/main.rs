//! confcache CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use confcache::cli::{AppContext, Cli, CommandDispatcher};
use confcache::config::load_system_env;
use confcache::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr so rendered configs on stdout stay clean.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("confcache=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("confcache=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("confcache starting with args: {:?}", cli);

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);
    let mut ui = create_ui(output_mode, cli.no_color);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            ui.error(&format!("Error: cannot read working directory: {}", e));
            return ExitCode::from(1);
        }
    };

    let context = match AppContext::resolve(&cli, &cwd, &load_system_env()) {
        Ok(context) => context,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            return ExitCode::from(2);
        }
    };

    let dispatcher = CommandDispatcher::new(context);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
