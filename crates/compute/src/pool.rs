//! Adapter over the rayon work-stealing pool.
//!
//! The pool is treated as a black box: work goes in through `submit` or
//! `scope`, and the only thing read back is the worker index rayon assigned
//! to the calling thread when it created it.

use rayon::{Scope, ThreadPool, ThreadPoolBuilder};
use tracing::info;

use stealscope_core::{ExecutionContext, Result, StealscopeError};

/// A fixed-size work-stealing pool.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Build a pool with `parallelism` threads named `stealscope-worker-{index}`.
    pub fn new(parallelism: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|index| format!("stealscope-worker-{}", index))
            .build()
            .map_err(|e| StealscopeError::PoolBuild(e.to_string()))?;
        info!("Worker pool started with {} threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    pub fn parallelism(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `job` on the pool and wait for its result. Panics in the job are
    /// resumed on the caller.
    pub fn submit<R, F>(&self, job: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(job)
    }

    /// Run `op` with a scope whose spawned jobs all finish before this returns.
    pub fn scope<'scope, R, F>(&self, op: F) -> R
    where
        F: FnOnce(&Scope<'scope>) -> R + Send,
        R: Send,
    {
        self.pool.scope(op)
    }
}

/// Execution context of the calling thread, with its pool worker index.
pub fn current_context() -> ExecutionContext {
    ExecutionContext::current_with(rayon::current_thread_index())
}
