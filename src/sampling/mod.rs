//! Background sampling thread.
//!
//! Every metrics enumeration owns one [`PeriodicSamplingLoop`]. The loop
//! sleeps for the configured interval, runs one sampling pass and repeats
//! until asked to stop. Stopping is cooperative: a pass that is already
//! running completes before the thread exits.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tracing::{debug, error, trace, warn, Span};

use crate::error::{Error, Result};


/// Lifecycle of a sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopState {
    Created,
    Running,
    StopRequested,
    Stopped,
}

#[derive(Debug)]
struct Shared {
    stop: Mutex<bool>,
    wake: Condvar,
    state: Mutex<LoopState>,
    passes: AtomicU64,
}

impl Shared {
    /// Sleeps until the interval elapses or a stop is requested.
    /// Returns `true` if the loop should exit.
    fn wait(&self, interval: Duration) -> bool {
        let deadline = Instant::now() + interval;
        let mut stop = self.stop.lock();
        while !*stop {
            if self.wake.wait_until(&mut stop, deadline).timed_out() {
                break;
            }
        }
        *stop
    }
}

/// A dedicated OS thread running one sampling pass per interval.
///
/// The interval is measured from the end of one pass to the start of the
/// next; there is no drift correction. The first pass runs one full
/// interval after [`start`](Self::start) because owners take an initial
/// sample synchronously.
///
/// A pass returning an error is logged and the loop continues. A pass that
/// panics is caught and logged the same way, so one bad collector never
/// takes the thread down.
#[derive(Debug)]
pub struct PeriodicSamplingLoop {
    name: String,
    interval: Duration,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicSamplingLoop {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            shared: Arc::new(Shared {
                stop: Mutex::new(false),
                wake: Condvar::new(),
                state: Mutex::new(LoopState::Created),
                passes: AtomicU64::new(0),
            }),
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> LoopState {
        *self.shared.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    /// Number of passes completed since the loop was started.
    pub fn passes(&self) -> u64 {
        self.shared.passes.load(Ordering::Acquire)
    }

    /// Spawns the sampling thread. The thread enters `span` for its whole
    /// lifetime so everything logged by `pass` carries the owner's context.
    pub fn start<F>(&mut self, span: Span, mut pass: F) -> Result<()>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        {
            let mut state = self.shared.state.lock();
            if *state != LoopState::Created {
                return Err(Error::system(format!("sampling loop '{}' was already started", self.name)));
            }
            *state = LoopState::Running;
        }

        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        let name = self.name.clone();

        let spawned = thread::Builder::new().name(self.name.clone()).spawn(move || {
            let _entered = span.enter();
            let exit_state = Arc::clone(&shared);
            scopeguard::defer! {
                *exit_state.state.lock() = LoopState::Stopped;
                debug!(name = %name, "sampling thread exited");
            }
            debug!(name = %name, interval_ms = interval.as_millis() as u64, "sampling thread started");

            while !shared.wait(interval) {
                let started = Instant::now();
                match panic::catch_unwind(AssertUnwindSafe(&mut pass)) {
                    Ok(Ok(())) => trace!(elapsed_us = started.elapsed().as_micros() as u64, "sampling pass complete"),
                    Ok(Err(e)) => warn!(error = %e, "sampling pass failed"),
                    Err(payload) => error!(panic = panic_message(payload.as_ref()), "sampling pass panicked"),
                }
                shared.passes.fetch_add(1, Ordering::AcqRel);
            }
        });

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            },
            Err(e) => {
                *self.shared.state.lock() = LoopState::Stopped;
                Err(e.into())
            },
        }
    }

    /// Asks the thread to exit after its current pass, without waiting.
    pub fn request_stop(&self) {
        *self.shared.stop.lock() = true;
        self.shared.wake.notify_all();

        let mut state = self.shared.state.lock();
        if *state == LoopState::Running {
            *state = LoopState::StopRequested;
        }
    }

    /// Requests a stop and blocks until the thread has exited.
    pub fn stop(&mut self) {
        self.request_stop();
        match self.handle.take() {
            Some(handle) => {
                if handle.join().is_err() {
                    error!(name = %self.name, "sampling thread terminated abnormally");
                }
            },
            None => *self.shared.state.lock() = LoopState::Stopped,
        }
    }
}

impl Drop for PeriodicSamplingLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
