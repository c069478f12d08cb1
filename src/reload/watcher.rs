//! Filesystem-event reload driver.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::coordinator::ReloadRequester;
use super::ReloadDriver;
use crate::error::{ConfcacheError, Result};

/// Requests a reload whenever a template file is created, written or removed.
///
/// Bursts of events for one change become several requests; the
/// coordinator coalesces them and reloads are idempotent.
pub struct WatchDriver {
    directory: PathBuf,
    watcher: Option<RecommendedWatcher>,
    thread: Option<JoinHandle<()>>,
}

impl WatchDriver {
    /// Start watching `directory` (non-recursively).
    pub fn start(directory: &Path, suffix: &str, requester: ReloadRequester) -> Result<Self> {
        let watch_error = |e: notify::Error| ConfcacheError::DirectoryScan {
            path: directory.to_path_buf(),
            message: format!("cannot watch: {}", e),
        };

        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(tx).map_err(watch_error)?;
        watcher
            .watch(directory, RecursiveMode::NonRecursive)
            .map_err(watch_error)?;

        let suffix = suffix.to_string();
        let thread = thread::spawn(move || {
            // Ends when the watcher is dropped and the channel closes
            for result in rx {
                match result {
                    Ok(event) if is_template_event(&event, &suffix) => {
                        tracing::debug!("Template change detected: {:?}", event.paths);
                        if !requester.request() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("File watcher error: {}", e),
                }
            }
        });

        tracing::info!("Watching {} for template changes", directory.display());
        Ok(Self {
            directory: directory.to_path_buf(),
            watcher: Some(watcher),
            thread: Some(thread),
        })
    }

    /// The watched directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ReloadDriver for WatchDriver {
    fn name(&self) -> &'static str {
        "watch"
    }

    fn stop(mut self: Box<Self>) {
        drop(self.watcher.take());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// True for create, modify and remove events touching a template file.
pub fn is_template_event(event: &Event, suffix: &str) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    relevant_kind
        && event.paths.iter().any(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(suffix))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn template_events_are_relevant() {
        let suffix = ".conf.tmpl";
        assert!(is_template_event(
            &event(EventKind::Create(CreateKind::File), "/conf/a.conf.tmpl"),
            suffix
        ));
        assert!(is_template_event(
            &event(EventKind::Modify(ModifyKind::Any), "/conf/a.conf.tmpl"),
            suffix
        ));
        assert!(is_template_event(
            &event(EventKind::Remove(RemoveKind::File), "/conf/a.conf.tmpl"),
            suffix
        ));
    }

    #[test]
    fn other_files_and_kinds_are_ignored() {
        let suffix = ".conf.tmpl";
        assert!(!is_template_event(
            &event(EventKind::Create(CreateKind::File), "/conf/a.conf.tmpl.swp"),
            suffix
        ));
        assert!(!is_template_event(
            &event(EventKind::Access(AccessKind::Any), "/conf/a.conf.tmpl"),
            suffix
        ));
    }

    #[test]
    fn missing_directory_is_scan_error() {
        let (tx, _rx) = mpsc::channel();
        let requester = ReloadRequester::from_sender(tx);
        let result = WatchDriver::start(Path::new("/nonexistent/templates"), ".conf.tmpl", requester);
        assert!(matches!(result, Err(ConfcacheError::DirectoryScan { .. })));
    }
}
