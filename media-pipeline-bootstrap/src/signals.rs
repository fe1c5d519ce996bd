// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # System Signal Handling
//!
//! Platform abstraction over termination signals (§5 Cancellation):
//! SIGTERM/SIGINT/SIGHUP on Unix, Ctrl-C on Windows. A [`SystemSignals`]
//! implementation runs in the background and invokes a caller-supplied
//! callback exactly once, the first time any recognized signal arrives.

use std::future::Future;
use std::pin::Pin;

/// A callback invoked once when a termination signal is received.
pub type ShutdownCallback = Box<dyn FnOnce() + Send + 'static>;

/// Installs a signal handler that calls `on_signal` once.
pub trait SystemSignals: Send + Sync {
    /// Waits for a termination signal, then runs `on_signal`. Returns once
    /// the callback has completed.
    fn wait_for_signal<'a>(&'a self, on_signal: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Selects the platform-appropriate [`SystemSignals`] implementation.
pub fn create_signal_handler() -> Box<dyn SystemSignals> {
    #[cfg(unix)]
    {
        Box::new(UnixSignals)
    }
    #[cfg(windows)]
    {
        Box::new(WindowsSignals)
    }
    #[cfg(not(any(unix, windows)))]
    {
        Box::new(NoOpSignalHandler)
    }
}

#[cfg(unix)]
pub struct UnixSignals;

#[cfg(unix)]
impl SystemSignals for UnixSignals {
    fn wait_for_signal<'a>(&'a self, on_signal: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
            let mut int = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
            let mut hup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

            tokio::select! {
                _ = term.recv() => tracing::info!("received SIGTERM"),
                _ = int.recv() => tracing::info!("received SIGINT"),
                _ = hup.recv() => tracing::info!("received SIGHUP"),
            }

            on_signal();
        })
    }
}

#[cfg(windows)]
pub struct WindowsSignals;

#[cfg(windows)]
impl SystemSignals for WindowsSignals {
    fn wait_for_signal<'a>(&'a self, on_signal: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received Ctrl-C");
            on_signal();
        })
    }
}

/// Never signals; used in tests and on unsupported platforms.
pub struct NoOpSignalHandler;

impl SystemSignals for NoOpSignalHandler {
    fn wait_for_signal<'a>(&'a self, _on_signal: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(std::future::pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn noop_handler_never_fires() {
        let handler = NoOpSignalHandler;
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = fired.clone();

        let wait = handler.wait_for_signal(Box::new(move || {
            fired_clone.store(true, Ordering::SeqCst);
        }));

        let timeout = tokio::time::timeout(std::time::Duration::from_millis(20), wait).await;
        assert!(timeout.is_err(), "no-op handler should never resolve");
        assert!(!fired.load(Ordering::SeqCst));
    }
}
