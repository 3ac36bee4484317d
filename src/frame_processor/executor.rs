// SPDX-License-Identifier: GPL-3.0-only

//! Worker contexts for filter computation
//!
//! The frame processor never runs a filter on the producer's thread. It
//! hands a boxed job to an [`Executor`] and returns immediately. Three
//! executors are provided:
//!
//! - [`BlockingPoolExecutor`]: tokio's blocking thread pool
//! - [`ThreadExecutor`]: one short-lived named OS thread per job
//! - [`ManualExecutor`]: queues jobs until the caller runs them, for
//!   deterministic tests and single-threaded embedding

use std::collections::VecDeque;
use std::io;
use std::sync::{Mutex, PoisonError};
use std::thread;
use tracing::{debug, warn};

/// A unit of work for the worker context
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs off the caller's thread
pub trait Executor: Send + Sync {
    /// Schedule `job`
    ///
    /// On error the job has been dropped without running.
    fn execute(&self, job: Job) -> io::Result<()>;
}

/// Executor backed by tokio's blocking thread pool
///
/// CPU-bound filter work belongs on the blocking pool, not on async worker
/// threads.
#[derive(Debug, Clone)]
pub struct BlockingPoolExecutor {
    handle: tokio::runtime::Handle,
}

impl BlockingPoolExecutor {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime of the calling context, if there is one
    pub fn current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

impl Executor for BlockingPoolExecutor {
    fn execute(&self, job: Job) -> io::Result<()> {
        // The JoinHandle is not needed: completion is observed through the
        // processor's result slot.
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }
}

/// Executor that spawns a named thread per job
///
/// At most one job per processor is in flight, so this stays at one worker
/// thread per pipeline.
#[derive(Debug, Clone)]
pub struct ThreadExecutor {
    name: String,
}

impl ThreadExecutor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::new("visionedge-worker")
    }
}

impl Executor for ThreadExecutor {
    fn execute(&self, job: Job) -> io::Result<()> {
        thread::Builder::new()
            .name(self.name.clone())
            .spawn(job)
            .map(|_| ())
            .inspect_err(|e| warn!(name = %self.name, error = %e, "Failed to spawn worker thread"))
    }
}

/// Executor that queues jobs until they are run explicitly
#[derive(Default)]
pub struct ManualExecutor {
    queue: Mutex<VecDeque<Job>>,
}

impl ManualExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued jobs
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Run the oldest queued job on the calling thread
    ///
    /// Returns `false` if the queue was empty.
    pub fn run_next(&self) -> bool {
        // Release the lock before running so the job may schedule more work
        let job = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run queued jobs until the queue is empty, returning how many ran
    pub fn run_all(&self) -> usize {
        let mut count = 0;
        while self.run_next() {
            count += 1;
        }
        count
    }

    /// Drop all queued jobs without running them
    pub fn discard_all(&self) -> usize {
        let discarded: Vec<Job> = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        debug!(count = discarded.len(), "Discarding queued jobs");
        discarded.len()
    }
}

impl Executor for ManualExecutor {
    fn execute(&self, job: Job) -> io::Result<()> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(job);
        Ok(())
    }
}
