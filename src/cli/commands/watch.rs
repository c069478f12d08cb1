//! Watch command implementation.
//!
//! The `confcache watch` command keeps the template registry in sync with
//! the template directory and cascades removed templates into the store
//! until interrupted.

use std::thread;
use std::time::{Duration, Instant};

use crate::cli::args::WatchArgs;
use crate::cli::context::AppContext;
use crate::cli::signal;
use crate::config::{format_duration, parse_ttl};
use crate::error::{ConfcacheError, Result};
use crate::reload::{start_driver, ReloadCoordinator};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

const TICK: Duration = Duration::from_millis(100);

/// The watch command implementation.
pub struct WatchCommand {
    context: AppContext,
    args: WatchArgs,
}

impl WatchCommand {
    /// Create a new watch command.
    pub fn new(context: AppContext, args: WatchArgs) -> Self {
        Self { context, args }
    }

    fn parse_flag(flag: &str, value: &str) -> Result<Duration> {
        parse_ttl(value).map_err(|e| ConfcacheError::ConfigValidationError {
            message: format!("--{}: {}", flag, e),
        })
    }

    fn interval(&self) -> Result<Duration> {
        match &self.args.interval {
            Some(value) => Self::parse_flag("interval", value),
            None => self.context.settings().reload_interval(),
        }
    }

    fn deadline(&self) -> Result<Option<Instant>> {
        let Some(value) = self.args.duration.as_deref() else {
            return Ok(None);
        };
        let duration = Self::parse_flag("duration", value)?;
        Instant::now()
            .checked_add(duration)
            .map(Some)
            .ok_or_else(|| ConfcacheError::ConfigValidationError {
                message: format!("--duration: '{}' is too large", value),
            })
    }
}

impl Command for WatchCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.context.settings();
        let mode = self.args.mode.unwrap_or(settings.reload.mode);
        let interval = self.interval()?;
        let deadline = self.deadline()?;

        let registry = self.context.load_registry()?;
        let store = self.context.open_store()?;
        let directory = settings.templates.directory.clone();

        ui.message(&format!(
            "Loaded {} template(s) from {}",
            registry.len(),
            directory.display()
        ));

        let handle = ReloadCoordinator::new(registry, store, directory.clone()).spawn();
        let driver = start_driver(
            mode,
            &directory,
            &settings.templates.suffix,
            interval,
            handle.requester(),
        )?;

        match &driver {
            Some(driver) if driver.name() == "poll" => ui.success(&format!(
                "Polling {} every {}",
                directory.display(),
                format_duration(interval)
            )),
            Some(_) => ui.success(&format!("Watching {}", directory.display())),
            None => ui.warning("Reload is off; templates will not be reloaded"),
        }

        signal::install_stop_handler();
        while !signal::stop_requested() {
            if deadline.is_some_and(|at| Instant::now() >= at) {
                break;
            }
            thread::sleep(TICK);
        }

        if let Some(driver) = driver {
            driver.stop();
        }
        let cycles = handle.cycles();
        handle.shutdown();

        ui.message(&format!("Stopped after {} reload cycle(s)", cycles));
        Ok(CommandResult::success())
    }
}
