//! The `reload → cascade` sequence and the thread that owns it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::Result;
use crate::store::ConfigStore;
use crate::template::TemplateRegistry;

/// Where the coordinator is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadState {
    /// Waiting for a signal.
    Idle,
    /// Re-reading the template directory.
    Scanning,
    /// Cascading removals into the store.
    Applying,
    /// The last scan failed; the previous template set is still live.
    Failed,
    /// The coordinator thread has exited.
    Stopped,
}

/// Outcome of one successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    /// Templates that disappeared in this cycle.
    pub removed: BTreeSet<String>,
    /// Artifact ids deleted by the cascade.
    pub cascaded: Vec<String>,
    /// Templates whose cascade was incomplete; retried next cycle.
    pub failed_cascades: BTreeSet<String>,
    /// Registry generation after the cycle.
    pub generation: u64,
}

/// Message sent to a running coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadSignal {
    /// Run a cycle.
    Reload,
    /// Exit after the current cycle.
    Shutdown,
}

/// Cloneable sender handed to drivers.
#[derive(Debug, Clone)]
pub struct ReloadRequester {
    tx: Sender<ReloadSignal>,
}

impl ReloadRequester {
    /// Wrap a sender whose receiver consumes the signals.
    pub fn from_sender(tx: Sender<ReloadSignal>) -> Self {
        Self { tx }
    }

    /// Ask for a reload. Returns `false` once the coordinator has exited.
    pub fn request(&self) -> bool {
        self.tx.send(ReloadSignal::Reload).is_ok()
    }
}

/// Drives template reloads and the cascades they trigger.
///
/// Owns the only code path that swaps the registry and removes artifacts,
/// so two drivers can never interleave halfway through a cycle.
pub struct ReloadCoordinator {
    registry: Arc<TemplateRegistry>,
    store: ConfigStore,
    directory: PathBuf,
    pending: BTreeSet<String>,
    state: Arc<Mutex<ReloadState>>,
}

impl ReloadCoordinator {
    /// Create a coordinator reloading `registry` from `directory`.
    pub fn new(
        registry: Arc<TemplateRegistry>,
        store: ConfigStore,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            store,
            directory: directory.into(),
            pending: BTreeSet::new(),
            state: Arc::new(Mutex::new(ReloadState::Idle)),
        }
    }

    /// The watched template directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Current state.
    pub fn state(&self) -> ReloadState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Templates with an incomplete cascade awaiting retry.
    pub fn pending(&self) -> &BTreeSet<String> {
        &self.pending
    }

    fn set_state(&self, state: ReloadState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Run one full cycle: reload the registry, then cascade every removed
    /// template (and every earlier failure still pending) into the store.
    ///
    /// # Errors
    ///
    /// Returns the reload error if the directory cannot be scanned or a
    /// template fails to parse. The registry and store are left as they
    /// were and pending cascades stay pending.
    pub fn run_cycle(&mut self) -> Result<ReloadReport> {
        self.set_state(ReloadState::Scanning);

        let removed = match self.registry.reload(&self.directory) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!("Template reload failed, keeping previous set: {}", e);
                self.set_state(ReloadState::Failed);
                return Err(e);
            }
        };

        // A template that came back no longer owes a cascade
        let registry = Arc::clone(&self.registry);
        self.pending.retain(|name| !registry.contains(name));

        self.set_state(ReloadState::Applying);

        let mut report = ReloadReport {
            removed: removed.clone(),
            generation: self.registry.generation(),
            ..Default::default()
        };

        let targets: BTreeSet<String> = removed.union(&self.pending).cloned().collect();
        for template in targets {
            match self.store.cascade(&template) {
                Ok(removal) => {
                    if !removal.is_complete() {
                        report.failed_cascades.insert(template.clone());
                    }
                    report.cascaded.extend(removal.removed);
                }
                Err(e) => {
                    tracing::warn!("Cascade for removed template {} failed: {}", template, e);
                    report.failed_cascades.insert(template);
                }
            }
        }
        report.cascaded.sort();
        self.pending = report.failed_cascades.clone();

        if !report.removed.is_empty() {
            tracing::info!(
                "Templates removed: {:?}; {} cached config(s) invalidated",
                report.removed,
                report.cascaded.len()
            );
        }

        self.set_state(ReloadState::Idle);
        Ok(report)
    }

    /// Move the coordinator onto its own thread.
    ///
    /// Queued reload requests are coalesced into one cycle. A shutdown is
    /// only observed between cycles, so a running cascade always finishes.
    pub fn spawn(self) -> CoordinatorHandle {
        let (tx, rx) = mpsc::channel();
        let state = Arc::clone(&self.state);
        let cycles = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&cycles);

        let thread = thread::spawn(move || self.run_loop(rx, counter));

        CoordinatorHandle {
            requester: ReloadRequester { tx },
            state,
            cycles,
            thread: Some(thread),
        }
    }

    fn run_loop(mut self, rx: Receiver<ReloadSignal>, cycles: Arc<AtomicU64>) {
        while let Ok(signal) = rx.recv() {
            let mut shutdown = signal == ReloadSignal::Shutdown;
            while let Ok(queued) = rx.try_recv() {
                shutdown |= queued == ReloadSignal::Shutdown;
            }
            if shutdown {
                break;
            }

            // Errors are logged in run_cycle; the loop keeps serving.
            let _ = self.run_cycle();
            cycles.fetch_add(1, Ordering::SeqCst);
        }

        self.set_state(ReloadState::Stopped);
        tracing::debug!("Reload coordinator stopped");
    }
}

/// Handle to a coordinator running on its own thread.
pub struct CoordinatorHandle {
    requester: ReloadRequester,
    state: Arc<Mutex<ReloadState>>,
    cycles: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl CoordinatorHandle {
    /// A sender drivers use to request reloads.
    pub fn requester(&self) -> ReloadRequester {
        self.requester.clone()
    }

    /// Current coordinator state.
    pub fn state(&self) -> ReloadState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of cycles run so far (successful or not).
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Stop the coordinator, waiting for any in-flight cycle to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.requester.tx.send(ReloadSignal::Shutdown);
            if thread.join().is_err() {
                tracing::warn!("Reload coordinator thread panicked");
            }
        }
    }
}

impl Drop for CoordinatorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
