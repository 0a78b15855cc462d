//! Recurring tick driver.
//!
//! Nothing ticks until a driver is started; stopping (or dropping) the driver
//! unregisters the timer and joins its thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::clock::Clock;
use crate::error::DriverError;
use crate::simulator::{SharedSimulator, TickReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Tick,
    Shutdown,
}

/// Calls `tick` on a shared simulator at a fixed interval from a background thread.
pub struct TickDriver {
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    signals: broadcast::Sender<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    /// Starts ticking `simulator` every `interval`, reading time from `clock`.
    ///
    /// The first tick happens one full interval after start.
    pub fn start<C: Clock>(
        simulator: SharedSimulator,
        interval: Duration,
        clock: C,
    ) -> Result<Self, DriverError> {
        if interval.is_zero() {
            return Err(DriverError::SpawnFailed(
                "tick interval must be greater than zero".to_string(),
            ));
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let (signals, mut signal_rx) = broadcast::channel(16);
        let thread_shutdown = Arc::clone(&shutdown);

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DriverError::SpawnFailed(format!("failed to build runtime: {}", e)))?;

        let handle = std::thread::Builder::new()
            .name("callaudit-tick".to_string())
            .spawn(move || {
                rt.block_on(async {
                    let mut timer = tokio::time::interval(interval);
                    timer.tick().await; // skip immediate first tick

                    loop {
                        if thread_shutdown.load(Ordering::Acquire) {
                            break;
                        }

                        tokio::select! {
                            _ = timer.tick() => {},
                            signal = signal_rx.recv() => match signal {
                                Ok(Signal::Tick) => tracing::debug!("Manual tick triggered"),
                                Ok(Signal::Shutdown) | Err(broadcast::error::RecvError::Closed) => break,
                                Err(broadcast::error::RecvError::Lagged(_)) => {}
                            },
                        }

                        if thread_shutdown.load(Ordering::Acquire) {
                            break;
                        }

                        let report = tick_shared(&simulator, &clock);
                        if !report.faults.is_empty() {
                            tracing::warn!("Tick finished with {} faulted job(s)", report.faults.len());
                        }
                    }
                });
            })
            .map_err(|e| DriverError::SpawnFailed(e.to_string()))?;

        tracing::info!("Tick driver started (interval {:?})", interval);

        Ok(Self {
            interval,
            shutdown,
            signals,
            handle: Some(handle),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Requests an immediate tick without waiting for the interval.
    pub fn trigger(&self) {
        let _ = self.signals.send(Signal::Tick);
    }

    /// Stops future ticks and waits for the driver thread to exit.
    /// Calling it again is a no-op.
    pub fn stop(&mut self) -> Result<(), DriverError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        self.shutdown.store(true, Ordering::Release);
        // Wake the select loop so it sees the shutdown
        let _ = self.signals.send(Signal::Shutdown);

        handle.join().map_err(|_| DriverError::Panicked)?;
        tracing::info!("Tick driver stopped");
        Ok(())
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("Tick driver did not stop cleanly: {}", e);
        }
    }
}

impl std::fmt::Debug for TickDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickDriver")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Runs one tick against a shared simulator, recovering a poisoned lock.
pub fn tick_shared<C: Clock + ?Sized>(simulator: &SharedSimulator, clock: &C) -> TickReport {
    let mut guard = match simulator.lock() {
        Ok(g) => g,
        Err(poisoned) => {
            log::warn!("Simulator lock was poisoned, recovering");
            poisoned.into_inner()
        }
    };
    guard.tick(clock.now())
}
