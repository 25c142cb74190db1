//! Tick-driven simulation session.
//!
//! The `TickExecutor` owns the clock and components of one run. Each step
//! applies the stimulus scheduled for the current cycle, runs every component
//! once in evaluation order, optionally samples the trace, then ticks.

use crate::clock::Clock;
use crate::error::CircuitResult;
use crate::executor::{run_one_tick, Simulations};
use crate::graph::GraphContext;
use crate::logic::Logic;
use crate::registry::ComponentRegistry;
use crate::stimulus::Stimulus;
use crate::trace::StateTrace;
use crate::types::{BlockId, Cycle};

/// Statistics collected by the tick executor.
#[derive(Clone, Debug, Default)]
pub struct TickExecutorStats {
    /// Total number of ticks executed
    pub ticks_executed: u64,
    /// Total number of component runs
    pub component_runs: u64,
    /// Total number of forced writes, manual and scheduled
    pub forced_writes: u64,
}

/// A tick-driven simulation session.
pub struct TickExecutor {
    clock: Clock,
    simulations: Simulations,
    stimulus: Stimulus,
    trace: Option<StateTrace>,
    stats: TickExecutorStats,
}

impl TickExecutor {
    /// Creates a session over already built simulations.
    pub fn new(simulations: Simulations, clock: Clock) -> Self {
        Self {
            clock,
            simulations,
            stimulus: Stimulus::new(),
            trace: None,
            stats: TickExecutorStats::default(),
        }
    }

    /// Creates the components of `graph` and a fresh clock.
    ///
    /// # Errors
    /// Unregistered block kinds and invalid block properties.
    pub fn from_graph(graph: &GraphContext, registry: &ComponentRegistry, resolution_ms: u64) -> CircuitResult<Self> {
        let clock = Clock::new(resolution_ms);
        let simulations = registry.create_simulations(graph, &clock)?;
        Ok(Self::new(simulations, clock))
    }

    /// Sets the scheduled writes applied while stepping.
    pub fn with_stimulus(mut self, stimulus: Stimulus) -> Self {
        self.stimulus = stimulus;
        self
    }

    /// Records the states of `probes` after every tick. An empty list probes
    /// every block, in evaluation order.
    pub fn with_trace(mut self, probes: Vec<BlockId>) -> Self {
        let probes = if probes.is_empty() {
            self.simulations.iter().map(|c| c.block()).collect()
        } else {
            probes
        };
        self.trace = Some(StateTrace::new(probes));
        self
    }

    /// Like [`with_trace`](Self::with_trace), labelling columns with the
    /// blocks' display names from `graph`.
    pub fn with_labelled_trace(mut self, graph: &GraphContext, probes: Vec<BlockId>) -> Self {
        let probes = if probes.is_empty() {
            graph.evaluation_order().to_vec()
        } else {
            probes
        };
        let labels = probes
            .iter()
            .map(|&block| match graph.page().blocks.get(block.index()) {
                Some(b) => b.display_name().to_string(),
                None => block.to_string(),
            })
            .collect();
        self.trace = Some(StateTrace::with_labels(probes, labels));
        self
    }

    /// Overwrites the state of a block now, outside any stimulus.
    ///
    /// Returns false if the block has no component.
    pub fn force(&mut self, block: BlockId, value: Logic) -> bool {
        let applied = self.simulations.force(block, value);
        if applied {
            self.stats.forced_writes += 1;
        } else {
            tracing::warn!(block = %block, "Ignoring write to a block without component");
        }
        applied
    }

    /// Executes a single tick.
    pub fn step(&mut self) {
        let cycle = self.clock.cycle();

        let scheduled = self.stimulus.events_at(cycle).to_vec();
        for event in scheduled {
            self.force(event.block, event.value);
        }

        run_one_tick(&mut self.simulations, &mut self.clock);
        self.stats.ticks_executed += 1;
        self.stats.component_runs += self.simulations.len() as u64;

        if let Some(trace) = self.trace.as_mut() {
            trace.record(cycle, &self.simulations);
        }
        tracing::trace!(cycle, "Tick");
    }

    /// Executes `ticks` ticks.
    pub fn run_for(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Steps until the clock reaches `cycle`.
    pub fn run_until(&mut self, cycle: Cycle) {
        while self.clock.cycle() < cycle {
            self.step();
        }
    }

    /// Current state of `block`.
    pub fn state(&self, block: BlockId) -> Option<Logic> {
        self.simulations.state(block)
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn simulations(&self) -> &Simulations {
        &self.simulations
    }

    pub fn stats(&self) -> &TickExecutorStats {
        &self.stats
    }

    pub fn trace(&self) -> Option<&StateTrace> {
        self.trace.as_ref()
    }

    /// Takes the recorded trace, leaving tracing disabled.
    pub fn take_trace(&mut self) -> Option<StateTrace> {
        self.trace.take()
    }

    /// Exports statistics as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "cycle": self.clock.cycle(),
            "resolution_ms": self.clock.resolution_ms(),
            "ticks_executed": self.stats.ticks_executed,
            "component_runs": self.stats.component_runs,
            "component_count": self.simulations.len(),
            "forced_writes": self.stats.forced_writes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::page::Page;
    use crate::registry::create_default_registry;

    /// A source signal driving a NOT gate.
    fn inverter_page() -> (Page, BlockId, BlockId) {
        let mut page = Page::new();
        let src = page.add_block("Signal");
        let out = page.add_output(src, "q");
        let not = page.add_block("NOT");
        let a = page.add_input(not, "a");
        page.add_output(not, "q");
        page.connect(out, a);
        (page, src, not)
    }

    fn executor(page: &Page) -> TickExecutor {
        let graph = build_graph(page).unwrap();
        TickExecutor::from_graph(&graph, &create_default_registry(), 100).unwrap()
    }

    #[test]
    fn test_tick_executor_creation() {
        let (page, _, _) = inverter_page();
        let exec = executor(&page);
        assert_eq!(exec.clock().cycle(), 0);
        assert_eq!(exec.clock().resolution_ms(), 100);
        assert_eq!(exec.simulations().len(), 2);
    }

    #[test]
    fn test_force_and_step() {
        let (page, src, not) = inverter_page();
        let mut exec = executor(&page);

        exec.step();
        assert_eq!(exec.state(not), Some(Logic::Unknown));

        assert!(exec.force(src, Logic::True));
        exec.step();
        assert_eq!(exec.state(not), Some(Logic::False));
        assert_eq!(exec.clock().cycle(), 2);
    }

    #[test]
    fn test_stimulus_applied_before_pass() {
        let (page, src, not) = inverter_page();
        let stimulus = Stimulus::new().at(0, src, false).at(3, src, true);
        let mut exec = executor(&page).with_stimulus(stimulus).with_trace(vec![not]);

        exec.run_until(5);

        let column = exec.trace().unwrap().column(not).unwrap();
        assert_eq!(
            column,
            vec![Logic::True, Logic::True, Logic::True, Logic::False, Logic::False]
        );
    }

    #[test]
    fn test_run_for() {
        let (page, _, _) = inverter_page();
        let mut exec = executor(&page);

        exec.run_for(5);

        let stats = exec.export_stats();
        assert_eq!(stats["ticks_executed"], 5);
        assert_eq!(stats["component_runs"], 10);
        assert_eq!(stats["cycle"], 5);
    }

    #[test]
    fn test_run_until_past_cycle_is_noop() {
        let (page, _, _) = inverter_page();
        let mut exec = executor(&page);
        exec.run_for(3);
        exec.run_until(2);
        assert_eq!(exec.stats().ticks_executed, 3);
    }

    #[test]
    fn test_force_unknown_block() {
        let (page, _, _) = inverter_page();
        let mut exec = executor(&page);
        assert!(!exec.force(BlockId(99), Logic::True));
        assert_eq!(exec.export_stats()["forced_writes"], 0);
    }

    #[test]
    fn test_trace_defaults_to_all_blocks() {
        let (page, src, not) = inverter_page();
        let mut exec = executor(&page).with_trace(Vec::new());
        exec.step();

        let trace = exec.take_trace().unwrap();
        assert_eq!(trace.probes(), [src, not]);
        assert!(exec.trace().is_none());
    }

    #[test]
    fn test_labelled_trace() {
        let (mut page, src, not) = inverter_page();
        page.set_label(src, "switch");
        let graph = build_graph(&page).unwrap();
        let exec = TickExecutor::from_graph(&graph, &create_default_registry(), 100)
            .unwrap()
            .with_labelled_trace(&graph, Vec::new());

        assert_eq!(exec.trace().unwrap().labels(), ["switch".to_string(), "NOT".to_string()]);
        assert_eq!(exec.trace().unwrap().probes(), [src, not]);
    }
}
