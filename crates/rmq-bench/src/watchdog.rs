//! Deadline bounded execution.
//!
//! A timed section runs on its own worker thread while the caller waits on a channel with a
//! deadline. Exceeding the deadline is reported as [`Error::Timeout`], never as an interrupt
//! inside the timed code. Everything the worker owns stays on the worker: after a timeout its
//! output is dropped there (or on the caller, if it arrives during the grace period), so nothing
//! half-built leaks into the next run.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    thread,
    time::Duration,
};

use log::{debug, warn};

use crate::{Error, Result};

/// Raised by the watchdog once the deadline has passed.
///
/// Loops issuing many operations should check it between operations and stop early.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watchdog {
    limit: Duration,
    grace: Duration,
}

impl Watchdog {
    /// Maximum time the grace period defaults to
    const MAX_GRACE: Duration = Duration::from_secs(1);

    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            grace: limit.min(Self::MAX_GRACE),
        }
    }

    /// How long to wait for a cancelled worker to stop before detaching it.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Run `task` on a worker thread named `name` and wait at most the deadline for its output.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the deadline passed, the task's output is discarded,
    /// - [`Error::WorkerPanicked`] if the task panicked,
    /// - [`Error::Io`] if the worker thread can not be spawned.
    pub fn run<T, F>(&self, name: &str, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&CancelFlag) -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        let cancel = CancelFlag::new();
        let flag = cancel.clone();

        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                let output = task(&flag);
                // Fails once the watchdog gave up, the output is then dropped here
                let _ = tx.send(output);
            })?;

        match rx.recv_timeout(self.limit) {
            Ok(output) => {
                let _ = handle.join();
                Ok(output)
            }
            Err(RecvTimeoutError::Timeout) => {
                cancel.cancel();
                match rx.recv_timeout(self.grace) {
                    Ok(late) => {
                        drop(late);
                        let _ = handle.join();
                        debug!("Worker `{name}` stopped after cancellation");
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        let _ = handle.join();
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        warn!("Worker `{name}` still running after {:?}, detached", self.grace);
                    }
                }
                Err(Error::Timeout { limit: self.limit })
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                Err(Error::WorkerPanicked)
            }
        }
    }
}
