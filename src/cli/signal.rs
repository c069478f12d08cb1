//! Stop flag for long-running commands.
//!
//! `watch` runs until interrupted. SIGINT and SIGTERM set a process-wide
//! flag that the command polls between sleeps, so the coordinator can
//! finish its current cycle and the drivers can be joined cleanly.

use std::sync::atomic::{AtomicBool, Ordering};

static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_signal(_signal: libc::c_int) {
    STOP_REQUESTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT and SIGTERM to the stop flag.
pub fn install_stop_handler() {
    #[cfg(unix)]
    {
        let handler = on_signal as extern "C" fn(libc::c_int);
        // SAFETY: the handler only stores to an atomic, which is
        // async-signal-safe.
        unsafe {
            libc::signal(libc::SIGINT, handler as libc::sighandler_t);
            libc::signal(libc::SIGTERM, handler as libc::sighandler_t);
        }
    }
}

/// Whether a stop signal has arrived.
pub fn stop_requested() -> bool {
    STOP_REQUESTED.load(Ordering::SeqCst)
}

/// Set the stop flag as if a signal had arrived.
pub fn request_stop() {
    STOP_REQUESTED.store(true, Ordering::SeqCst);
}

/// Clear the stop flag.
pub fn reset() {
    STOP_REQUESTED.store(false, Ordering::SeqCst);
}
