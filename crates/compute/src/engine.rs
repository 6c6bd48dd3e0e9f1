use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use stealscope_core::{EngineConfig, Result, RootIdAllocator, SortStrategy};

use crate::collect::{self, RangeSummary};
use crate::pacing::Pacer;
use crate::pool::WorkerPool;
use crate::probe::Probe;
use crate::sink::EventSink;
use crate::sort::{self, SortElement, SortOutcome, SortPolicy};

/// Owns the pool, the pacing and the root counter for a series of runs.
pub struct Engine {
    config: EngineConfig,
    pool: WorkerPool,
    pacer: Arc<Pacer>,
    probe: Probe,
    roots: RootIdAllocator,
}

impl Engine {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.resolved_parallelism())?;
        let pacer = Arc::new(Pacer::new(config.event_delay(), config.jitter));
        let probe = Probe::new(sink, Arc::clone(&pacer));
        Ok(Self {
            config,
            pool,
            pacer,
            probe,
            roots: RootIdAllocator::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn pacer(&self) -> &Arc<Pacer> {
        &self.pacer
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    /// Sort `input` as a new root submission.
    pub fn sort<T: SortElement>(&self, input: Vec<T>, strategy: SortStrategy) -> Result<SortOutcome<T>> {
        let root_id = self.roots.next_id();
        let len = input.len();
        info!("Sorting {} elements as root {} ({})", len, root_id, strategy);

        let start = Instant::now();
        let outcome = sort::sort(
            &self.pool,
            &self.probe,
            root_id,
            input,
            strategy,
            SortPolicy::from_config(&self.config),
        )?;
        info!(
            "  root {} done in {:.3}s: {} nodes, {} merges",
            root_id,
            start.elapsed().as_secs_f64(),
            outcome.nodes,
            outcome.merges
        );
        Ok(outcome)
    }

    /// Sort generated data with the configured strategy.
    pub fn sort_with_config_data(&self) -> Result<SortOutcome<i64>> {
        self.sort(generate_input(&self.config), self.config.strategy)
    }

    /// Traverse `0..len` through an instrumented range.
    pub fn traverse_range(&self, len: usize) -> RangeSummary {
        let root_id = self.roots.next_id();
        info!("Traversing range of {} as root {}", len, root_id);

        let start = Instant::now();
        let summary = collect::traverse_range(&self.pool, &self.probe, root_id, len);
        info!(
            "  root {} done in {:.3}s: {} values seen",
            root_id,
            start.elapsed().as_secs_f64(),
            summary.span.count
        );
        summary
    }
}

/// Sort input per config: `n, n-1, ..., 1`, or random values in
/// `0..max_value` (seeded when a seed is configured).
pub fn generate_input(config: &EngineConfig) -> Vec<i64> {
    let n = config.problem_size;
    if !config.random_data {
        return (1..=n as i64).rev().collect();
    }
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..n).map(|_| rng.gen_range(0..config.max_value)).collect()
}
