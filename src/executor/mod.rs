//! Steady-state simulation.
//!
//! [`Simulations`] owns the components of one run in evaluation order and
//! advances them by one synchronous pass per tick. Each component reads its
//! inputs from components that already ran in the same pass, except for
//! feedback into stateful components, which sees last tick's value.
//!
//! [`tick::TickExecutor`] wraps a `Simulations` with its clock and adds
//! forcing, scheduled stimulus, tracing and statistics.

pub mod tick;

use std::collections::HashMap;

use crate::clock::Clock;
use crate::component::Component;
use crate::logic::Logic;
use crate::types::{BlockId, ComponentId};

pub use tick::{TickExecutor, TickExecutorStats};

/// The components of one simulation run, stored in evaluation order.
///
/// `ComponentId(i)` is the i-th component of that order.
#[derive(Clone, Debug)]
pub struct Simulations {
    components: Vec<Component>,
    index: HashMap<BlockId, ComponentId>,
    levels: Vec<Logic>,
}

impl Simulations {
    /// Creates a run from wired components.
    ///
    /// # Panics
    /// If an input refers to a component outside `components`.
    pub fn new(components: Vec<Component>, index: HashMap<BlockId, ComponentId>) -> Self {
        for component in &components {
            for input in component.inputs() {
                if let Some(source) = input.source {
                    assert!(
                        source.index() < components.len(),
                        "block {} reads from missing component {}",
                        component.block(),
                        source
                    );
                }
            }
        }
        Self {
            components,
            index,
            levels: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component simulating `block`.
    pub fn get(&self, block: BlockId) -> Option<&Component> {
        self.index.get(&block).map(|id| &self.components[id.index()])
    }

    pub fn get_mut(&mut self, block: BlockId) -> Option<&mut Component> {
        let id = *self.index.get(&block)?;
        Some(&mut self.components[id.index()])
    }

    /// Position of `block`'s component in evaluation order.
    pub fn component_id(&self, block: BlockId) -> Option<ComponentId> {
        self.index.get(&block).copied()
    }

    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.index()]
    }

    /// Current state of `block`'s component.
    pub fn state(&self, block: BlockId) -> Option<Logic> {
        self.get(block).map(Component::state)
    }

    /// Overwrites the state of `block`'s component. Returns false if the
    /// block has no component.
    pub fn force(&mut self, block: BlockId, value: Logic) -> bool {
        match self.get_mut(block) {
            Some(component) => {
                component.force(value);
                true
            }
            None => false,
        }
    }

    /// Components in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Runs every component once, in evaluation order.
    pub fn run(&mut self, clock: &Clock) {
        for position in 0..self.components.len() {
            self.levels.clear();
            for input in self.components[position].inputs() {
                let level = match input.source {
                    Some(source) => input.level(self.components[source.index()].state()),
                    None => Logic::Unknown,
                };
                self.levels.push(level);
            }
            self.components[position].run(&self.levels, clock);
        }
    }
}

/// Advances every component by exactly one cycle, then ticks the clock.
pub fn run_one_tick(simulations: &mut Simulations, clock: &mut Clock) {
    simulations.run(clock);
    clock.tick();
}
