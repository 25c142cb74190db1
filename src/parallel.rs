//! Independent batch runs over one resolved graph.
//!
//! A single simulation is strictly sequential, but separate runs over the
//! same [`GraphContext`] share nothing mutable: each gets its own clock and
//! components. `BatchRunner` runs one simulation per [`Stimulus`] and returns
//! their traces in input order.
//!
//! # Feature Flag
//!
//! Runs execute on the rayon thread pool with the `parallel` feature:
//! ```toml
//! [dependencies]
//! circuitry = { version = "0.1", features = ["parallel"] }
//! ```
//! Without it they execute one after another.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use parking_lot::Mutex;

use crate::clock::DEFAULT_RESOLUTION_MS;
use crate::error::CircuitResult;
use crate::executor::TickExecutor;
use crate::graph::GraphContext;
use crate::registry::ComponentRegistry;
use crate::stimulus::Stimulus;
use crate::trace::StateTrace;
use crate::types::{BlockId, Cycle};

/// Totals over every run of a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Completed runs
    pub runs: usize,
    /// Ticks executed across all runs
    pub ticks_executed: u64,
    /// Component runs across all runs
    pub component_runs: u64,
    /// Forced writes across all runs
    pub forced_writes: u64,
}

/// Result of a batch: one trace per stimulus, in stimulus order.
#[derive(Clone, Debug)]
pub struct BatchOutcome {
    pub traces: Vec<StateTrace>,
    pub stats: BatchStats,
}

/// Runs several simulations of the same graph.
///
/// # Example
///
/// ```
/// use circuitry::{build_graph, create_default_registry, Page, Stimulus};
/// use circuitry::parallel::BatchRunner;
///
/// let mut page = Page::new();
/// let src = page.add_block("Signal");
/// let q = page.add_output(src, "q");
/// let not = page.add_block("NOT");
/// let a = page.add_input(not, "a");
/// page.connect(q, a);
///
/// let graph = build_graph(&page).unwrap();
/// let registry = create_default_registry();
/// let outcome = BatchRunner::new(&graph, &registry)
///     .cycles(3)
///     .run(&[Stimulus::new().at(0, src, true), Stimulus::new().at(0, src, false)])
///     .unwrap();
///
/// assert_eq!(outcome.traces.len(), 2);
/// assert_eq!(outcome.stats.ticks_executed, 6);
/// ```
pub struct BatchRunner<'a> {
    graph: &'a GraphContext,
    registry: &'a ComponentRegistry,
    resolution_ms: u64,
    cycles: Cycle,
    probes: Vec<BlockId>,
    /// Number of worker threads (0 = auto)
    num_threads: usize,
}

impl<'a> BatchRunner<'a> {
    /// Creates a runner with the default resolution and no ticks.
    pub fn new(graph: &'a GraphContext, registry: &'a ComponentRegistry) -> Self {
        Self {
            graph,
            registry,
            resolution_ms: DEFAULT_RESOLUTION_MS,
            cycles: 0,
            probes: Vec::new(),
            num_threads: 0,
        }
    }

    /// Sets the clock resolution of every run.
    pub fn resolution_ms(mut self, ms: u64) -> Self {
        self.resolution_ms = ms;
        self
    }

    /// Sets the number of ticks per run.
    pub fn cycles(mut self, cycles: Cycle) -> Self {
        self.cycles = cycles;
        self
    }

    /// Sets the traced blocks; empty traces every block.
    pub fn probes(mut self, probes: Vec<BlockId>) -> Self {
        self.probes = probes;
        self
    }

    /// Sets the number of worker threads.
    ///
    /// Pass 0 for automatic detection (uses number of CPUs). Has no effect
    /// without the `parallel` feature.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Runs one simulation per stimulus.
    ///
    /// # Errors
    /// The first construction error of any run; construction depends only on
    /// the graph, so if one run fails they all do.
    pub fn run(&self, stimuli: &[Stimulus]) -> CircuitResult<BatchOutcome> {
        let stats = Mutex::new(BatchStats::default());
        let traces = self.run_all(stimuli, &stats)?;
        let stats = stats.into_inner();

        tracing::info!(
            runs = stats.runs,
            ticks = stats.ticks_executed,
            parallel = cfg!(feature = "parallel"),
            "Batch finished"
        );
        Ok(BatchOutcome { traces, stats })
    }

    #[cfg(not(feature = "parallel"))]
    fn run_all(&self, stimuli: &[Stimulus], stats: &Mutex<BatchStats>) -> CircuitResult<Vec<StateTrace>> {
        stimuli.iter().map(|s| self.run_one(s, stats)).collect()
    }

    #[cfg(feature = "parallel")]
    fn run_all(&self, stimuli: &[Stimulus], stats: &Mutex<BatchStats>) -> CircuitResult<Vec<StateTrace>> {
        if self.num_threads > 0 {
            match rayon::ThreadPoolBuilder::new().num_threads(self.num_threads).build() {
                Ok(pool) => {
                    return pool.install(|| stimuli.par_iter().map(|s| self.run_one(s, stats)).collect());
                }
                Err(err) => tracing::warn!(error = %err, "Falling back to the global thread pool"),
            }
        }
        stimuli.par_iter().map(|s| self.run_one(s, stats)).collect()
    }

    fn run_one(&self, stimulus: &Stimulus, stats: &Mutex<BatchStats>) -> CircuitResult<StateTrace> {
        let mut executor = TickExecutor::from_graph(self.graph, self.registry, self.resolution_ms)?
            .with_stimulus(stimulus.clone())
            .with_labelled_trace(self.graph, self.probes.clone());
        executor.run_for(self.cycles);

        {
            let mut totals = stats.lock();
            totals.runs += 1;
            totals.ticks_executed += executor.stats().ticks_executed;
            totals.component_runs += executor.stats().component_runs;
            totals.forced_writes += executor.stats().forced_writes;
        }

        Ok(executor.take_trace().unwrap_or_default())
    }
}
