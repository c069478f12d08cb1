//! Template reloading.
//!
//! A single [`ReloadCoordinator`] owns the `reload → cascade` sequence.
//! Drivers never touch the registry or store; they only send reload
//! requests to the coordinator's channel:
//!
//! - [`WatchDriver`] reacts to filesystem events in the template directory.
//! - [`PollDriver`] requests a reload on a fixed interval.
//!
//! ```text
//! driver ──request──▶ coordinator ──reload──▶ TemplateRegistry
//!                          │
//!                          └──cascade(removed)──▶ ConfigStore
//! ```

pub mod coordinator;
pub mod poller;
pub mod watcher;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use coordinator::{
    CoordinatorHandle, ReloadCoordinator, ReloadReport, ReloadRequester, ReloadSignal,
    ReloadState,
};
pub use poller::PollDriver;
pub use watcher::{is_template_event, WatchDriver};

/// Which driver triggers reloads.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReloadMode {
    /// Filesystem notifications
    #[default]
    Watch,
    /// Fixed-interval re-scan
    Poll,
    /// No automatic reloads
    Off,
}

impl fmt::Display for ReloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReloadMode::Watch => write!(f, "watch"),
            ReloadMode::Poll => write!(f, "poll"),
            ReloadMode::Off => write!(f, "off"),
        }
    }
}

/// A running source of reload requests.
pub trait ReloadDriver: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Stop producing requests and wait for the driver thread to exit.
    fn stop(self: Box<Self>);
}

/// Start the driver selected by `mode`. `Off` starts nothing.
pub fn start_driver(
    mode: ReloadMode,
    directory: &Path,
    suffix: &str,
    interval: Duration,
    requester: ReloadRequester,
) -> Result<Option<Box<dyn ReloadDriver>>> {
    let driver: Box<dyn ReloadDriver> = match mode {
        ReloadMode::Watch => Box::new(WatchDriver::start(directory, suffix, requester)?),
        ReloadMode::Poll => Box::new(PollDriver::start(interval, requester)),
        ReloadMode::Off => return Ok(None),
    };
    Ok(Some(driver))
}
