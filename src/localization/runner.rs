//! Background estimation loop
//!
//! The engine is moved into a worker thread that runs one full cycle,
//! publishes a snapshot, then waits out the cycle period. The wait is the
//! only place a shutdown request is noticed, so a cycle is never cut short.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::info;

use crate::common::{LocalizationError, LocalizationResult, StateEstimator};
use crate::localization::config::FilterConfig;
use crate::localization::snapshot::{snapshot_channel, FilterSnapshot, SnapshotReader};

/// How the worker loop is paced and when it stops on its own
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnerOptions {
    pub period: Duration,
    /// Stop after this many cycles; `None` runs until shutdown
    pub max_cycles: Option<u64>,
}

impl RunnerOptions {
    pub fn new(period: Duration) -> Self {
        Self { period, max_cycles: None }
    }

    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }
}

impl From<&FilterConfig> for RunnerOptions {
    fn from(config: &FilterConfig) -> Self {
        Self::new(config.cycle_period)
    }
}

/// Clears the running flag when the worker exits, including by panic
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Spawns estimation loops
pub struct FilterRunner;

impl FilterRunner {
    /// Move `engine` into a worker thread and start cycling
    pub fn spawn<E>(mut engine: E, options: RunnerOptions) -> LocalizationResult<FilterHandle<E>>
    where
        E: StateEstimator<Snapshot = FilterSnapshot> + Send + 'static,
    {
        let (publisher, reader) = snapshot_channel(engine.snapshot());
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let running = Arc::new(AtomicBool::new(true));
        let worker_running = Arc::clone(&running);

        let worker = thread::Builder::new()
            .name("particle-filter".to_string())
            .spawn(move || {
                let _running = RunningGuard(worker_running);
                info!("estimation loop started, period {:?}", options.period);
                loop {
                    if options.max_cycles.map_or(false, |max| engine.cycles() >= max) {
                        break;
                    }

                    engine.step();
                    publisher.publish(engine.snapshot());

                    match stop_rx.recv_timeout(options.period) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("estimation loop stopped after {} cycles", engine.cycles());
                engine
            })?;

        Ok(FilterHandle {
            reader,
            running,
            stop: Some(stop_tx),
            worker: Some(worker),
        })
    }
}

/// Owner-side handle to a running estimation loop
pub struct FilterHandle<E> {
    reader: SnapshotReader,
    running: Arc<AtomicBool>,
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<E>>,
}

impl<E> FilterHandle<E> {
    /// Reader for the latest published snapshot
    pub fn reader(&self) -> SnapshotReader {
        self.reader.clone()
    }

    pub fn latest(&self) -> Arc<FilterSnapshot> {
        self.reader.latest()
    }

    /// False once the loop has exited, for whatever reason
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Poll the latest snapshot every `period`, calling `on_update` once per
    /// new cycle, until the loop exits or `quit` is raised. `quit` is checked
    /// before every pass.
    pub fn watch<F>(&self, quit: &AtomicBool, period: Duration, mut on_update: F)
    where
        F: FnMut(&FilterSnapshot),
    {
        let mut last_cycle = None;
        while !quit.load(Ordering::SeqCst) && self.is_running() {
            let snapshot = self.reader.latest();
            if last_cycle != Some(snapshot.cycle) {
                last_cycle = Some(snapshot.cycle);
                on_update(&snapshot);
            }
            thread::sleep(period);
        }
    }

    /// Ask the loop to stop at the next cycle boundary
    pub fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The loop may already have exited; nothing left to tell it then.
            let _ = stop.send(());
        }
    }

    /// Stop the loop and hand the engine back
    pub fn join(mut self) -> LocalizationResult<E> {
        self.shutdown();
        let worker = self
            .worker
            .take()
            .ok_or_else(|| LocalizationError::ConcurrencyError("worker already joined".to_string()))?;
        worker
            .join()
            .map_err(|_| LocalizationError::ConcurrencyError("estimation thread panicked".to_string()))
    }

    /// Block until the loop exits by itself (cycle limit), then hand the engine back
    pub fn wait(mut self) -> LocalizationResult<E> {
        let worker = self
            .worker
            .take()
            .ok_or_else(|| LocalizationError::ConcurrencyError("worker already joined".to_string()))?;
        let result = worker
            .join()
            .map_err(|_| LocalizationError::ConcurrencyError("estimation thread panicked".to_string()));
        self.stop.take();
        result
    }
}

impl<E> Drop for FilterHandle<E> {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
